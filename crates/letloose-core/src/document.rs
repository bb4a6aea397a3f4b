//! Persisted form of the controller state.

use serde::{Deserialize, Serialize};

use crate::host::SimId;
use crate::managed::Baseline;
use crate::range::RangeConfig;

/// Current schema version for persisted controller documents.
pub const DOCUMENT_FORMAT_VERSION: u16 = 1;

/// Persisted state of one managed simulation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRecord {
    pub id: SimId,
    pub baseline: Baseline,
    pub enabled: bool,
    pub range_config: RangeConfig,
}

/// Ordered list of per-simulation records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerDocument {
    pub version: u16,
    pub records: Vec<SimulationRecord>,
}

impl ControllerDocument {
    #[must_use]
    pub fn new(records: Vec<SimulationRecord>) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            records,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for ControllerDocument {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
