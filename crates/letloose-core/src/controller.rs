//! Elapsed-time scheduler that drives the registry against a host.

use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ControllerConfig};
use crate::document::ControllerDocument;
use crate::host::{SimId, SimulationHost};
use crate::registry::{ApplyReport, ReconcileReport, Registry, RegistryError, TickReport};

/// What the controller is doing, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerStatus {
    Searching { waited: f32 },
    Tracking { count: usize },
    Exhausted { waited: f32 },
    Disabled,
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerStatus::Searching { waited } => {
                write!(f, "Waiting for an active simulation ({waited:.0}s)...")
            }
            ControllerStatus::Tracking { count: 1 } => f.write_str("Tracking 1 simulation"),
            ControllerStatus::Tracking { count } => write!(f, "Tracking {count} simulations"),
            ControllerStatus::Exhausted { waited } => write!(
                f,
                "No active simulation found in {waited:.0} seconds. \
                 Activate one and re-enable the controller."
            ),
            ControllerStatus::Disabled => f.write_str("Controller disabled"),
        }
    }
}

/// Which periodic passes ran during one [`Controller::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub activated: Vec<SimId>,
    pub reconciled: Option<ReconcileReport>,
    pub document: Option<ApplyReport>,
    pub ticked: Option<TickReport>,
}

/// Accumulates frame time and fires at most once per update.
#[derive(Debug, Clone, Copy)]
struct Cadence {
    period: f32,
    elapsed: f32,
}

impl Cadence {
    fn new(period: f32) -> Self {
        Self {
            period,
            elapsed: 0.0,
        }
    }

    /// A cadence that fires on the first update.
    fn primed(period: f32) -> Self {
        Self {
            period,
            elapsed: period,
        }
    }

    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.period {
            return false;
        }
        self.elapsed %= self.period;
        true
    }
}

/// Owns the host and the registry, and decides when to poll and when to tick.
pub struct Controller<H: SimulationHost> {
    host: H,
    config: ControllerConfig,
    registry: Registry,
    poll: Cadence,
    tick: Cadence,
    waited: f32,
    enabled: bool,
    status: ControllerStatus,
    pending_document: Option<ControllerDocument>,
}

impl<H: SimulationHost> fmt::Debug for Controller<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<H: SimulationHost> Controller<H> {
    pub fn new(host: H, config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: Registry::from_config(&config),
            poll: Cadence::primed(config.poll_interval),
            tick: Cadence::new(config.tick_interval),
            host,
            config,
            waited: 0.0,
            enabled: true,
            status: ControllerStatus::Searching { waited: 0.0 },
            pending_document: None,
        })
    }

    /// Advance the controller by `elapsed` seconds of frame time.
    pub fn update(&mut self, elapsed: f32) -> UpdateReport {
        let mut report = UpdateReport::default();
        if !self.enabled {
            return report;
        }
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };

        report.activated = self.registry.settle_pending();

        if self.poll.advance(elapsed) && !self.is_exhausted() {
            self.poll_host(&mut report);
        }

        if self.tick.advance(elapsed) && self.registry.has_live_entries() {
            let angle = self.host.sample_tilt_angle();
            report.ticked = Some(self.registry.tick(angle));
        }

        if !self.registry.is_empty() {
            self.status = ControllerStatus::Tracking {
                count: self.registry.len(),
            };
        }
        report
    }

    fn poll_host(&mut self, report: &mut UpdateReport) {
        let candidates = self.host.enumerate_candidates();
        let reconciled = self.registry.reconcile(candidates);

        if self.registry.is_empty() {
            self.waited += self.config.poll_interval;
            if self.waited >= self.config.search_limit {
                warn!(
                    waited = self.waited,
                    kind = %self.config.managed_kind,
                    "no active simulation found; polling stopped"
                );
                self.status = ControllerStatus::Exhausted {
                    waited: self.waited,
                };
            } else {
                self.status = ControllerStatus::Searching {
                    waited: self.waited,
                };
            }
        } else {
            self.waited = 0.0;
            if let Some(document) = self.pending_document.take() {
                report.document = Some(self.registry.apply_document(&document));
            }
        }

        self.registry.refresh_selected_advisory();
        report.reconciled = Some(reconciled);
    }

    /// Restore every entry and stop driving the host until [`Controller::enable`].
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.registry.teardown();
        self.enabled = false;
        self.status = ControllerStatus::Disabled;
        info!("controller disabled");
    }

    /// Resume after [`Controller::disable`] or an exhausted search.
    pub fn enable(&mut self) {
        self.waited = 0.0;
        self.poll = Cadence::primed(self.config.poll_interval);
        if self.enabled {
            if self.is_exhausted() {
                self.status = ControllerStatus::Searching { waited: 0.0 };
                debug!("search window reset");
            }
            return;
        }
        self.enabled = true;
        self.registry.resume();
        self.status = if self.registry.is_empty() {
            ControllerStatus::Searching { waited: 0.0 }
        } else {
            ControllerStatus::Tracking {
                count: self.registry.len(),
            }
        };
        info!("controller enabled");
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.status, ControllerStatus::Exhausted { .. })
    }

    #[must_use]
    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn toggle_enable(&mut self, id: &SimId) -> Result<bool, RegistryError> {
        let enabled = self.registry.toggle_enable(id)?;
        self.registry.refresh_selected_advisory();
        Ok(enabled)
    }

    #[must_use]
    pub fn document(&self) -> ControllerDocument {
        self.registry.document()
    }

    /// Apply records to the entries tracked right now.
    pub fn apply_document(&mut self, document: &ControllerDocument) -> ApplyReport {
        self.registry.apply_document(document)
    }

    /// Hold records until the first poll that finds matching objects, then apply them
    /// in place of capturing fresh baselines.
    pub fn load_document(&mut self, document: ControllerDocument) {
        if document.is_empty() {
            return;
        }
        debug!(records = document.records.len(), "document queued");
        self.pending_document = Some(document);
    }
}

impl<H: SimulationHost> Drop for Controller<H> {
    fn drop(&mut self) {
        if self.enabled {
            self.registry.teardown();
        }
    }
}
