//! User-editable angle window and derived-parameter bounds.

use serde::{Deserialize, Serialize};

use crate::config::{Interval, OverrideLimits};
use crate::host::FloatParam;

/// Parameters recomputed from the tilt signal on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivedParam {
    MainRigidity,
    TipRigidity,
    StyleCling,
}

impl DerivedParam {
    pub const ALL: [DerivedParam; 3] = [
        DerivedParam::MainRigidity,
        DerivedParam::TipRigidity,
        DerivedParam::StyleCling,
    ];

    #[must_use]
    pub const fn host_param(self) -> FloatParam {
        match self {
            DerivedParam::MainRigidity => FloatParam::MainRigidity,
            DerivedParam::TipRigidity => FloatParam::TipRigidity,
            DerivedParam::StyleCling => FloatParam::StyleCling,
        }
    }

    /// Decimal places written to the host.
    #[must_use]
    pub const fn decimals(self) -> u32 {
        match self {
            DerivedParam::MainRigidity => 3,
            DerivedParam::TipRigidity => 4,
            DerivedParam::StyleCling => 2,
        }
    }

    #[must_use]
    pub fn ceiling(self, limits: &OverrideLimits) -> f32 {
        match self {
            DerivedParam::MainRigidity => limits.main_rigidity_ceiling,
            DerivedParam::TipRigidity => limits.tip_rigidity_ceiling,
            DerivedParam::StyleCling => limits.style_cling_ceiling,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        self.host_param().label()
    }

    const fn fields(self) -> (RangeField, RangeField) {
        match self {
            DerivedParam::MainRigidity => (RangeField::MinMainRigidity, RangeField::MaxMainRigidity),
            DerivedParam::TipRigidity => (RangeField::MinTipRigidity, RangeField::MaxTipRigidity),
            DerivedParam::StyleCling => (RangeField::MinStyleCling, RangeField::MaxStyleCling),
        }
    }
}

/// Which end of a (lower, upper) pair an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lower,
    Upper,
}

/// One of the eight editable range fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeField {
    LowerAngleLimit,
    UpperAngleLimit,
    MinMainRigidity,
    MaxMainRigidity,
    MinTipRigidity,
    MaxTipRigidity,
    MinStyleCling,
    MaxStyleCling,
}

impl RangeField {
    pub const ALL: [RangeField; 8] = [
        RangeField::LowerAngleLimit,
        RangeField::UpperAngleLimit,
        RangeField::MinMainRigidity,
        RangeField::MaxMainRigidity,
        RangeField::MinTipRigidity,
        RangeField::MaxTipRigidity,
        RangeField::MinStyleCling,
        RangeField::MaxStyleCling,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RangeField::LowerAngleLimit => "Lower limit °",
            RangeField::UpperAngleLimit => "Upper limit °",
            RangeField::MinMainRigidity => "Main rigidity at lower limit",
            RangeField::MaxMainRigidity => "Main rigidity at upper limit",
            RangeField::MinTipRigidity => "Tip rigidity at lower limit",
            RangeField::MaxTipRigidity => "Tip rigidity at upper limit",
            RangeField::MinStyleCling => "Style cling at lower limit",
            RangeField::MaxStyleCling => "Style cling at upper limit",
        }
    }

    /// Decimal places shown by a bound control.
    #[must_use]
    pub const fn display_decimals(self) -> usize {
        match self {
            RangeField::LowerAngleLimit | RangeField::UpperAngleLimit => 0,
            RangeField::MinTipRigidity | RangeField::MaxTipRigidity => 4,
            RangeField::MinStyleCling | RangeField::MaxStyleCling => 2,
            RangeField::MinMainRigidity | RangeField::MaxMainRigidity => 3,
        }
    }

    /// Range a control bound to this field may take.
    #[must_use]
    pub fn slider(self, limits: &OverrideLimits) -> Interval {
        match self {
            RangeField::LowerAngleLimit | RangeField::UpperAngleLimit => limits.angle_range,
            RangeField::MinMainRigidity | RangeField::MaxMainRigidity => {
                Interval::new(0.0, limits.main_rigidity_ceiling)
            }
            RangeField::MinTipRigidity | RangeField::MaxTipRigidity => {
                Interval::new(0.0, limits.tip_rigidity_ceiling)
            }
            RangeField::MinStyleCling | RangeField::MaxStyleCling => {
                Interval::new(0.0, limits.style_cling_ceiling)
            }
        }
    }

    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            RangeField::LowerAngleLimit
            | RangeField::MinMainRigidity
            | RangeField::MinTipRigidity
            | RangeField::MinStyleCling => Side::Lower,
            RangeField::UpperAngleLimit
            | RangeField::MaxMainRigidity
            | RangeField::MaxTipRigidity
            | RangeField::MaxStyleCling => Side::Upper,
        }
    }
}

/// Apply an edit to one end of a pair, dragging the other end along when they would cross.
#[must_use]
pub fn pairwise_clamp(side: Side, value: f32, lower: f32, upper: f32) -> (f32, f32) {
    match side {
        Side::Lower => (value, upper.max(value)),
        Side::Upper => (lower.min(value), value),
    }
}

/// Angle window plus (min, max) pairs for every derived parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    lower_angle_limit: f32,
    upper_angle_limit: f32,
    min_main_rigidity: f32,
    max_main_rigidity: f32,
    min_tip_rigidity: f32,
    max_tip_rigidity: f32,
    min_style_cling: f32,
    max_style_cling: f32,
}

impl RangeConfig {
    /// Control defaults used before a simulation has been activated.
    #[must_use]
    pub fn defaults(limits: &OverrideLimits) -> Self {
        Self {
            lower_angle_limit: limits.default_lower_angle,
            upper_angle_limit: limits.default_upper_angle,
            min_main_rigidity: 0.005_f32.min(limits.main_rigidity_ceiling),
            max_main_rigidity: 0.025_f32.min(limits.main_rigidity_ceiling),
            min_tip_rigidity: limits.default_min_tip_rigidity,
            max_tip_rigidity: 0.002_f32
                .min(limits.tip_rigidity_ceiling)
                .max(limits.default_min_tip_rigidity),
            min_style_cling: 0.0,
            max_style_cling: 0.0,
        }
    }

    #[must_use]
    pub fn get(&self, field: RangeField) -> f32 {
        match field {
            RangeField::LowerAngleLimit => self.lower_angle_limit,
            RangeField::UpperAngleLimit => self.upper_angle_limit,
            RangeField::MinMainRigidity => self.min_main_rigidity,
            RangeField::MaxMainRigidity => self.max_main_rigidity,
            RangeField::MinTipRigidity => self.min_tip_rigidity,
            RangeField::MaxTipRigidity => self.max_tip_rigidity,
            RangeField::MinStyleCling => self.min_style_cling,
            RangeField::MaxStyleCling => self.max_style_cling,
        }
    }

    fn slot(&mut self, field: RangeField) -> &mut f32 {
        match field {
            RangeField::LowerAngleLimit => &mut self.lower_angle_limit,
            RangeField::UpperAngleLimit => &mut self.upper_angle_limit,
            RangeField::MinMainRigidity => &mut self.min_main_rigidity,
            RangeField::MaxMainRigidity => &mut self.max_main_rigidity,
            RangeField::MinTipRigidity => &mut self.min_tip_rigidity,
            RangeField::MaxTipRigidity => &mut self.max_tip_rigidity,
            RangeField::MinStyleCling => &mut self.min_style_cling,
            RangeField::MaxStyleCling => &mut self.max_style_cling,
        }
    }

    /// Returns the (lower, upper) fields sharing a pair with `field`.
    const fn pair_of(field: RangeField) -> (RangeField, RangeField) {
        match field {
            RangeField::LowerAngleLimit | RangeField::UpperAngleLimit => {
                (RangeField::LowerAngleLimit, RangeField::UpperAngleLimit)
            }
            RangeField::MinMainRigidity | RangeField::MaxMainRigidity => {
                DerivedParam::MainRigidity.fields()
            }
            RangeField::MinTipRigidity | RangeField::MaxTipRigidity => {
                DerivedParam::TipRigidity.fields()
            }
            RangeField::MinStyleCling | RangeField::MaxStyleCling => {
                DerivedParam::StyleCling.fields()
            }
        }
    }

    /// Write one field, clamped to its control range, then restore the pair ordering.
    ///
    /// Non-finite values are ignored. Returns the value the field ended up with.
    pub fn edit(&mut self, field: RangeField, value: f32, limits: &OverrideLimits) -> f32 {
        if !value.is_finite() {
            return self.get(field);
        }
        let value = field.slider(limits).clamp(value);
        let (lower_field, upper_field) = Self::pair_of(field);
        let (lower, upper) =
            pairwise_clamp(field.side(), value, self.get(lower_field), self.get(upper_field));
        *self.slot(lower_field) = lower;
        *self.slot(upper_field) = upper;
        self.get(field)
    }

    /// Force persisted or hand-built values back inside control ranges and pair ordering.
    #[must_use]
    pub fn sanitized(mut self, limits: &OverrideLimits) -> Self {
        let fallback = Self::defaults(limits);
        for field in RangeField::ALL {
            let raw = self.get(field);
            let value = if raw.is_finite() {
                field.slider(limits).clamp(raw)
            } else {
                fallback.get(field)
            };
            *self.slot(field) = value;
        }
        for field in RangeField::ALL {
            if field.side() == Side::Lower {
                let value = self.get(field);
                self.edit(field, value, limits);
            }
        }
        self
    }

    #[must_use]
    pub const fn angle_window(&self) -> (f32, f32) {
        (self.lower_angle_limit, self.upper_angle_limit)
    }

    #[must_use]
    pub fn bounds(&self, param: DerivedParam) -> (f32, f32) {
        let (lower, upper) = param.fields();
        (self.get(lower), self.get(upper))
    }

    pub(crate) fn set_bounds(&mut self, param: DerivedParam, min: f32, max: f32) {
        let (lower, upper) = param.fields();
        *self.slot(lower) = min.min(max);
        *self.slot(upper) = max;
    }
}
