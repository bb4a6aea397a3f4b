//! Contract between the controller and the simulation host it overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable key identifying a host object across polls (distinct from its display label).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimId(pub String);

impl SimId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SimId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Scalar parameters the controller reads or writes on a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatParam {
    Weight,
    Drag,
    GravityMultiplier,
    MainRigidity,
    TipRigidity,
    StyleCling,
}

impl FloatParam {
    pub const ALL: [FloatParam; 6] = [
        FloatParam::Weight,
        FloatParam::Drag,
        FloatParam::GravityMultiplier,
        FloatParam::MainRigidity,
        FloatParam::TipRigidity,
        FloatParam::StyleCling,
    ];

    /// Name under which the host exposes the parameter.
    #[must_use]
    pub const fn host_name(self) -> &'static str {
        match self {
            FloatParam::Weight => "weight",
            FloatParam::Drag => "drag",
            FloatParam::GravityMultiplier => "gravityMultiplier",
            FloatParam::MainRigidity => "mainRigidity",
            FloatParam::TipRigidity => "tipRigidity",
            FloatParam::StyleCling => "cling",
        }
    }

    /// Human-readable label used in status and advisory text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            FloatParam::Weight => "Weight",
            FloatParam::Drag => "Drag",
            FloatParam::GravityMultiplier => "Gravity Multiplier",
            FloatParam::MainRigidity => "Main rigidity",
            FloatParam::TipRigidity => "Tip rigidity",
            FloatParam::StyleCling => "Style cling",
        }
    }
}

/// Boolean parameters the controller reads or writes on a host object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolParam {
    UsePaintedRigidity,
}

impl BoolParam {
    #[must_use]
    pub const fn host_name(self) -> &'static str {
        match self {
            BoolParam::UsePaintedRigidity => "usePaintedRigidity",
        }
    }
}

/// Failures reported by host accessors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// The backing host object was destroyed or deactivated.
    #[error("host object {id} is gone")]
    Gone { id: SimId },
    #[error("host does not expose parameter {0}")]
    UnknownParameter(&'static str),
    #[error("host rejected write to {param}: {reason}")]
    Rejected { param: &'static str, reason: String },
}

impl HostError {
    /// Whether the error means there is no object left to restore.
    #[must_use]
    pub const fn is_gone(&self) -> bool {
        matches!(self, HostError::Gone { .. })
    }
}

/// Typed view onto one host object's tunable parameters.
pub trait ParamAccessor: Send {
    fn get_float(&self, param: FloatParam) -> Result<f32, HostError>;

    fn set_float(&mut self, param: FloatParam, value: f32) -> Result<(), HostError>;

    fn get_bool(&self, param: BoolParam) -> Result<bool, HostError>;

    fn set_bool(&mut self, param: BoolParam, value: bool) -> Result<(), HostError>;
}

/// One object reported by the host during enumeration.
pub struct Candidate {
    pub id: SimId,
    pub label: String,
    /// Host type tag matched against the controller's managed-kind filter.
    pub kind: String,
    pub active: bool,
    pub accessor: Box<dyn ParamAccessor>,
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("active", &self.active)
            .finish()
    }
}

/// Entry points the controller consumes from the embedding platform.
pub trait SimulationHost {
    /// Enumerate every candidate object currently known to the host.
    fn enumerate_candidates(&mut self) -> Vec<Candidate>;

    /// Sample the external tilt signal in degrees.
    fn sample_tilt_angle(&mut self) -> f32;
}
