//! Controller configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Closed interval used for slider ranges and recommended value windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Per-parameter limits applied when a managed simulation is activated or edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OverrideLimits {
    /// Slider range for both angle limits, in degrees.
    pub angle_range: Interval,
    pub default_lower_angle: f32,
    pub default_upper_angle: f32,
    /// Upper slider bound (and activation cap) for main rigidity.
    pub main_rigidity_ceiling: f32,
    /// Upper slider bound (and activation cap) for tip rigidity.
    pub tip_rigidity_ceiling: f32,
    /// Upper slider bound (and activation cap) for style cling.
    pub style_cling_ceiling: f32,
    /// Tip rigidity lower bound seeded at activation.
    pub default_min_tip_rigidity: f32,
    pub recommended_drag: Interval,
    pub recommended_gravity: Interval,
}

impl Default for OverrideLimits {
    fn default() -> Self {
        Self {
            angle_range: Interval::new(-90.0, 90.0),
            default_lower_angle: 45.0,
            default_upper_angle: 90.0,
            main_rigidity_ceiling: 0.100,
            tip_rigidity_ceiling: 0.010,
            style_cling_ceiling: 1.0,
            default_min_tip_rigidity: 0.000,
            recommended_drag: Interval::new(0.050, 0.300),
            recommended_gravity: Interval::new(0.900, 1.100),
        }
    }
}

impl OverrideLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.angle_range.is_well_formed() {
            return Err(ConfigError::InvalidConfig(
                "angle_range must be finite with min <= max",
            ));
        }
        if !self.angle_range.contains(self.default_lower_angle)
            || !self.angle_range.contains(self.default_upper_angle)
            || self.default_lower_angle > self.default_upper_angle
        {
            return Err(ConfigError::InvalidConfig(
                "default angle limits must be ordered and inside angle_range",
            ));
        }
        if !(self.main_rigidity_ceiling > 0.0)
            || !(self.tip_rigidity_ceiling > 0.0)
            || !(self.style_cling_ceiling > 0.0)
        {
            return Err(ConfigError::InvalidConfig(
                "parameter ceilings must be positive",
            ));
        }
        if self.default_min_tip_rigidity < 0.0
            || self.default_min_tip_rigidity > self.tip_rigidity_ceiling
        {
            return Err(ConfigError::InvalidConfig(
                "default_min_tip_rigidity must lie in [0, tip_rigidity_ceiling]",
            ));
        }
        if !self.recommended_drag.is_well_formed() || !self.recommended_gravity.is_well_formed() {
            return Err(ConfigError::InvalidConfig(
                "recommended drag/gravity windows must be finite with min <= max",
            ));
        }
        Ok(())
    }
}

/// Static configuration for an override controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seconds between reconciliation passes against the host object set.
    pub poll_interval: f32,
    /// Seconds between evaluation ticks.
    pub tick_interval: f32,
    /// Seconds without any matching host object before polling stops.
    pub search_limit: f32,
    /// Host type tag of objects the controller manages.
    pub managed_kind: String,
    pub limits: OverrideLimits,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: 1.0,
            tick_interval: 1.0 / 30.0,
            search_limit: 60.0,
            managed_kind: "CustomHairItem".to_owned(),
            limits: OverrideLimits::default(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.poll_interval > 0.0) || !self.poll_interval.is_finite() {
            return Err(ConfigError::InvalidConfig("poll_interval must be positive"));
        }
        if !(self.tick_interval > 0.0) || !self.tick_interval.is_finite() {
            return Err(ConfigError::InvalidConfig("tick_interval must be positive"));
        }
        if self.tick_interval > self.poll_interval {
            return Err(ConfigError::InvalidConfig(
                "tick_interval cannot exceed poll_interval",
            ));
        }
        if !(self.search_limit >= self.poll_interval) {
            return Err(ConfigError::InvalidConfig(
                "search_limit must be at least one poll_interval",
            ));
        }
        if self.managed_kind.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("managed_kind must be non-empty"));
        }
        self.limits.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_tick_slower_than_poll() {
        let config = ControllerConfig {
            tick_interval: 2.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_unordered_default_angles() {
        let config = ControllerConfig {
            limits: OverrideLimits {
                default_lower_angle: 80.0,
                default_upper_angle: 10.0,
                ..OverrideLimits::default()
            },
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"poll_interval": 0.5, "managed_kind": "Cloth"}"#)
                .expect("config");
        assert_eq!(config.poll_interval, 0.5);
        assert_eq!(config.managed_kind, "Cloth");
        assert_eq!(config.limits, OverrideLimits::default());
        assert!(config.validate().is_ok());
    }
}
