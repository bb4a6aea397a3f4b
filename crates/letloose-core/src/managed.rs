//! Override controller for a single tracked host object.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::config::OverrideLimits;
use crate::document::SimulationRecord;
use crate::host::{BoolParam, FloatParam, HostError, ParamAccessor, SimId};
use crate::mapping::{lerp, normalize, round_to_decimals};
use crate::notify::{self, Advisory};
use crate::range::{DerivedParam, RangeConfig, RangeField};

/// Host parameter values captured when a simulation is first activated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub use_painted_rigidity: bool,
    pub weight: f32,
    pub drag: f32,
    pub gravity_multiplier: f32,
    pub main_rigidity: f32,
    pub tip_rigidity: f32,
    pub style_cling: f32,
}

impl Baseline {
    /// Read all seven baseline fields from the host.
    pub fn capture(accessor: &dyn ParamAccessor) -> Result<Self, HostError> {
        Ok(Self {
            use_painted_rigidity: accessor.get_bool(BoolParam::UsePaintedRigidity)?,
            weight: accessor.get_float(FloatParam::Weight)?,
            drag: accessor.get_float(FloatParam::Drag)?,
            gravity_multiplier: accessor.get_float(FloatParam::GravityMultiplier)?,
            main_rigidity: accessor.get_float(FloatParam::MainRigidity)?,
            tip_rigidity: accessor.get_float(FloatParam::TipRigidity)?,
            style_cling: accessor.get_float(FloatParam::StyleCling)?,
        })
    }

    #[must_use]
    pub fn get(&self, param: FloatParam) -> f32 {
        match param {
            FloatParam::Weight => self.weight,
            FloatParam::Drag => self.drag,
            FloatParam::GravityMultiplier => self.gravity_multiplier,
            FloatParam::MainRigidity => self.main_rigidity,
            FloatParam::TipRigidity => self.tip_rigidity,
            FloatParam::StyleCling => self.style_cling,
        }
    }

    /// Write every field back, continuing past failures; the first failure is returned.
    fn write_to(&self, accessor: &mut dyn ParamAccessor) -> Result<(), HostError> {
        let mut first_err = accessor
            .set_bool(BoolParam::UsePaintedRigidity, self.use_painted_rigidity)
            .err();
        for param in FloatParam::ALL {
            if let Err(err) = accessor.set_float(param, self.get(param)) {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Derived parameter values last written to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedValues {
    pub main_rigidity: f32,
    pub tip_rigidity: f32,
    pub style_cling: f32,
}

impl DerivedValues {
    #[must_use]
    pub fn get(&self, param: DerivedParam) -> f32 {
        match param {
            DerivedParam::MainRigidity => self.main_rigidity,
            DerivedParam::TipRigidity => self.tip_rigidity,
            DerivedParam::StyleCling => self.style_cling,
        }
    }

    fn from_fn(mut f: impl FnMut(DerivedParam) -> f32) -> Self {
        Self {
            main_rigidity: f(DerivedParam::MainRigidity),
            tip_rigidity: f(DerivedParam::TipRigidity),
            style_cling: f(DerivedParam::StyleCling),
        }
    }
}

/// One tracked host object whose tuning parameters are overridden from the tilt signal.
pub struct ManagedSimulation {
    id: SimId,
    label: String,
    accessor: Box<dyn ParamAccessor>,
    limits: OverrideLimits,
    baseline: Option<Baseline>,
    range: RangeConfig,
    derived: Option<DerivedValues>,
    enabled: bool,
    force_disabled: bool,
    has_bound_controls: bool,
    painted_rigidity_disabled: bool,
    capped: Vec<Advisory>,
    last_advisory: String,
}

impl fmt::Debug for ManagedSimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedSimulation")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("baseline", &self.baseline)
            .field("range", &self.range)
            .field("enabled", &self.enabled)
            .field("force_disabled", &self.force_disabled)
            .finish()
    }
}

impl ManagedSimulation {
    #[must_use]
    pub fn new(
        id: SimId,
        label: impl Into<String>,
        accessor: Box<dyn ParamAccessor>,
        limits: OverrideLimits,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            accessor,
            limits,
            baseline: None,
            range: RangeConfig::defaults(&limits),
            derived: None,
            enabled: true,
            force_disabled: false,
            has_bound_controls: false,
            painted_rigidity_disabled: false,
            capped: Vec::new(),
            last_advisory: String::new(),
        }
    }

    /// Capture the baseline, seed the derived bounds from it, and start overriding.
    ///
    /// Once a baseline exists this only re-applies the non-destructive steps (see
    /// [`ManagedSimulation::reactivate`]). Nothing is committed unless every host write
    /// succeeds; on failure the host is put back to the captured values and the entry
    /// stays unactivated. Returns the advisories raised.
    pub fn activate(&mut self) -> Result<Vec<Advisory>, HostError> {
        if self.baseline.is_some() {
            return self.reactivate();
        }

        let baseline = Baseline::capture(self.accessor.as_ref())?;
        let mut range = self.range;
        let mut capped = Vec::new();
        for param in DerivedParam::ALL {
            let value = baseline.get(param.host_param());
            let ceiling = param.ceiling(&self.limits);
            let max = if value > ceiling {
                capped.push(Advisory::Capped {
                    param,
                    value,
                    ceiling,
                });
                ceiling
            } else {
                round_to_decimals(value.max(0.0), 3)
            };
            let min = match param {
                DerivedParam::MainRigidity => round_to_decimals(max / 10.0, 3),
                DerivedParam::TipRigidity => self.limits.default_min_tip_rigidity,
                DerivedParam::StyleCling => max,
            };
            range.set_bounds(param, min, max);
        }
        let initial = DerivedValues::from_fn(|param| range.bounds(param).1);

        if let Err(err) = self.write_activation(&baseline, initial) {
            if let Err(rollback_err) = baseline.write_to(self.accessor.as_mut()) {
                debug!(id = %self.id, ?rollback_err, "rollback after failed activation");
            }
            return Err(err);
        }

        self.baseline = Some(baseline);
        self.range = range;
        self.derived = Some(initial);
        self.painted_rigidity_disabled = baseline.use_painted_rigidity;

        let mut advisories = Vec::new();
        if self.painted_rigidity_disabled {
            advisories.push(Advisory::PaintedRigidityDisabled);
        }
        advisories.extend(notify::check_drag(baseline.drag, &self.limits));
        advisories.extend(notify::check_gravity(baseline.gravity_multiplier, &self.limits));
        advisories.extend(capped.iter().cloned());
        self.capped = capped;

        info!(
            id = %self.id,
            advisories = advisories.len(),
            "activated managed simulation"
        );
        Ok(advisories)
    }

    /// Host writes performed by a first activation, in order.
    fn write_activation(
        &mut self,
        baseline: &Baseline,
        initial: DerivedValues,
    ) -> Result<(), HostError> {
        if baseline.use_painted_rigidity {
            self.accessor.set_bool(BoolParam::UsePaintedRigidity, false)?;
        }
        for param in DerivedParam::ALL {
            self.accessor.set_float(param.host_param(), initial.get(param))?;
        }
        Ok(())
    }

    /// Re-apply painted-rigidity handling and current overrides without touching the
    /// baseline or the configured bounds.
    pub fn reactivate(&mut self) -> Result<Vec<Advisory>, HostError> {
        if self.baseline.is_none() {
            return self.activate();
        }

        let mut advisories = Vec::new();
        if self.accessor.get_bool(BoolParam::UsePaintedRigidity)? {
            self.accessor.set_bool(BoolParam::UsePaintedRigidity, false)?;
            self.painted_rigidity_disabled = true;
        }
        if self.painted_rigidity_disabled {
            advisories.push(Advisory::PaintedRigidityDisabled);
        }
        let drag = self.accessor.get_float(FloatParam::Drag)?;
        let gravity = self.accessor.get_float(FloatParam::GravityMultiplier)?;
        advisories.extend(notify::check_drag(drag, &self.limits));
        advisories.extend(notify::check_gravity(gravity, &self.limits));

        let current = self
            .derived
            .unwrap_or_else(|| DerivedValues::from_fn(|param| self.range.bounds(param).1));
        self.write_derived(current)?;
        debug!(id = %self.id, "reactivated managed simulation");
        Ok(advisories)
    }

    /// Compute the derived values for `angle` without touching the host.
    #[must_use]
    pub fn compute(&self, angle: f32) -> DerivedValues {
        let (lower, upper) = self.range.angle_window();
        let factor = normalize(angle, lower, upper);
        DerivedValues::from_fn(|param| {
            let (min, max) = self.range.bounds(param);
            round_to_decimals(lerp(min, max, factor), param.decimals()).clamp(min, max)
        })
    }

    /// Recompute every derived parameter from `angle` and write it to the host.
    ///
    /// Nothing is written before the first activation.
    pub fn evaluate(&mut self, angle: f32) -> Result<DerivedValues, HostError> {
        let values = self.compute(angle);
        if self.baseline.is_none() {
            debug!(id = %self.id, "skipping evaluation before activation");
            return Ok(values);
        }
        self.write_derived(values)?;
        Ok(values)
    }

    fn write_derived(&mut self, values: DerivedValues) -> Result<(), HostError> {
        for param in DerivedParam::ALL {
            self.accessor.set_float(param.host_param(), values.get(param))?;
        }
        self.derived = Some(values);
        Ok(())
    }

    /// Write the captured baseline back to the host. No-op before the first activation.
    pub fn restore(&mut self) -> Result<(), HostError> {
        let Some(baseline) = self.baseline else {
            return Ok(());
        };
        baseline.write_to(self.accessor.as_mut())?;
        debug!(id = %self.id, "restored baseline");
        Ok(())
    }

    /// Persistable record, or `None` before the first activation.
    #[must_use]
    pub fn to_record(&self) -> Option<SimulationRecord> {
        self.baseline.map(|baseline| SimulationRecord {
            id: self.id.clone(),
            baseline,
            enabled: self.enabled,
            range_config: self.range,
        })
    }

    /// Adopt a persisted record. The baseline is taken from the record, never re-captured.
    ///
    /// For an enabled record the painted-rigidity write happens first; if it fails the
    /// entry is left exactly as it was.
    pub fn apply_record(&mut self, record: &SimulationRecord) -> Result<(), HostError> {
        let disable_painted = record.enabled && record.baseline.use_painted_rigidity;
        if disable_painted {
            self.accessor.set_bool(BoolParam::UsePaintedRigidity, false)?;
        }

        self.baseline = Some(record.baseline);
        self.range = record.range_config.sanitized(&self.limits);
        self.enabled = record.enabled;
        self.derived = None;
        self.capped.clear();
        self.painted_rigidity_disabled = disable_painted;

        if !self.enabled {
            return self.restore();
        }
        Ok(())
    }

    /// Edit one range field through the pairwise clamp. Returns the value applied.
    pub fn edit_range(&mut self, field: RangeField, value: f32) -> f32 {
        self.range.edit(field, value, &self.limits)
    }

    #[must_use]
    pub fn id(&self) -> &SimId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    #[must_use]
    pub fn range(&self) -> &RangeConfig {
        &self.range
    }

    #[must_use]
    pub fn limits(&self) -> &OverrideLimits {
        &self.limits
    }

    #[must_use]
    pub fn derived(&self) -> Option<DerivedValues> {
        self.derived
    }

    #[must_use]
    pub const fn ever_activated(&self) -> bool {
        self.baseline.is_some()
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn force_disabled(&self) -> bool {
        self.force_disabled
    }

    /// Whether the entry should be evaluated on ticks.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.enabled && !self.force_disabled && self.baseline.is_some()
    }

    #[must_use]
    pub const fn has_bound_controls(&self) -> bool {
        self.has_bound_controls
    }

    #[must_use]
    pub const fn painted_rigidity_disabled(&self) -> bool {
        self.painted_rigidity_disabled
    }

    /// Cap events recorded at the last activation.
    #[must_use]
    pub fn capped(&self) -> &[Advisory] {
        &self.capped
    }

    #[must_use]
    pub fn last_advisory(&self) -> &str {
        &self.last_advisory
    }

    pub(crate) fn accessor(&self) -> &dyn ParamAccessor {
        self.accessor.as_ref()
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_force_disabled(&mut self, force_disabled: bool) {
        self.force_disabled = force_disabled;
    }

    pub(crate) fn set_bound_controls(&mut self, bound: bool) {
        self.has_bound_controls = bound;
    }

    pub(crate) fn set_last_advisory(&mut self, text: String) {
        self.last_advisory = text;
    }
}
