//! Core types for the LetLoose tilt-driven override controller.
//!
//! A [`Controller`] polls a [`SimulationHost`] for simulations of the managed kind, tracks
//! them in a [`Registry`], and on every tick rewrites their rigidity and cling parameters
//! from the host's tilt angle. The captured [`Baseline`] of each simulation is written back
//! whenever an entry is disabled, untracked, or the controller shuts down.

pub mod config;
pub mod controller;
pub mod document;
pub mod host;
pub mod managed;
pub mod mapping;
pub mod memory;
pub mod notify;
pub mod panel;
pub mod range;
pub mod registry;

pub use config::{ConfigError, ControllerConfig, Interval, OverrideLimits};
pub use controller::{Controller, ControllerStatus, UpdateReport};
pub use document::{ControllerDocument, DOCUMENT_FORMAT_VERSION, SimulationRecord};
pub use host::{BoolParam, Candidate, FloatParam, HostError, ParamAccessor, SimId, SimulationHost};
pub use managed::{Baseline, DerivedValues, ManagedSimulation};
pub use memory::{MemoryHost, SimParams};
pub use notify::{Advisory, Drift};
pub use panel::{FieldView, PanelView};
pub use range::{DerivedParam, RangeConfig, RangeField, Side, pairwise_clamp};
pub use registry::{ApplyReport, EntryKey, ReconcileReport, Registry, RegistryError, TickReport};
