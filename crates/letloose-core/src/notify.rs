//! Status and advisory text derived from a managed simulation.

use std::fmt;

use crate::config::OverrideLimits;
use crate::host::{BoolParam, FloatParam, HostError};
use crate::managed::ManagedSimulation;
use crate::mapping::round_to_decimals;
use crate::range::DerivedParam;

/// Which side of a recommended window a value fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    Low,
    High,
}

impl Drift {
    fn as_str(self) -> &'static str {
        match self {
            Drift::Low => "low",
            Drift::High => "high",
        }
    }
}

/// A single human-readable notice about a managed simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The host has painted rigidity switched on, which the overrides cannot coexist with.
    PaintedRigidityActive,
    /// The controller switched painted rigidity off.
    PaintedRigidityDisabled,
    DragOutOfRange {
        value: f32,
        drift: Drift,
        min: f32,
        max: f32,
    },
    GravityOutOfRange {
        value: f32,
        drift: Drift,
    },
    /// A baseline value exceeded the control ceiling and was capped at activation.
    Capped {
        param: DerivedParam,
        value: f32,
        ceiling: f32,
    },
}

impl Advisory {
    /// Whether the notice reports a value drifting out of its recommended range.
    #[must_use]
    pub const fn is_drift(&self) -> bool {
        matches!(
            self,
            Advisory::PaintedRigidityActive
                | Advisory::DragOutOfRange { .. }
                | Advisory::GravityOutOfRange { .. }
        )
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::PaintedRigidityActive => {
                f.write_str("Use Painted Rigidity must be disabled for this controller to work!")
            }
            Advisory::PaintedRigidityDisabled => {
                f.write_str("Painted rigidity has been disabled for the selected simulation.")
            }
            Advisory::DragOutOfRange {
                value,
                drift,
                min,
                max,
            } => write!(
                f,
                "{} {value} seems {}. Recommended value: between {min} and {max}.",
                FloatParam::Drag.label(),
                drift.as_str()
            ),
            Advisory::GravityOutOfRange { value, drift } => write!(
                f,
                "{} {value} seems {}. Recommended value: 1.000",
                FloatParam::GravityMultiplier.label(),
                drift.as_str()
            ),
            Advisory::Capped {
                param,
                value,
                ceiling,
            } => write!(
                f,
                "{} {value} exceeds the supported maximum; capped to {ceiling}.",
                param.label()
            ),
        }
    }
}

fn drift_of(value: f32, min: f32, max: f32) -> Option<Drift> {
    if value < min {
        Some(Drift::Low)
    } else if value > max {
        Some(Drift::High)
    } else {
        None
    }
}

/// Compare drag (rounded to 3 decimals) with the recommended window.
#[must_use]
pub fn check_drag(drag: f32, limits: &OverrideLimits) -> Option<Advisory> {
    let value = round_to_decimals(drag, 3);
    let window = limits.recommended_drag;
    drift_of(value, window.min, window.max).map(|drift| Advisory::DragOutOfRange {
        value,
        drift,
        min: window.min,
        max: window.max,
    })
}

/// Compare the gravity multiplier (rounded to 3 decimals) with the recommended window.
#[must_use]
pub fn check_gravity(gravity_multiplier: f32, limits: &OverrideLimits) -> Option<Advisory> {
    let value = round_to_decimals(gravity_multiplier, 3);
    let window = limits.recommended_gravity;
    drift_of(value, window.min, window.max)
        .map(|drift| Advisory::GravityOutOfRange { value, drift })
}

fn bound_marker(value: f32, min: f32, max: f32) -> &'static str {
    if min == max {
        ""
    } else if value <= min {
        " (min)"
    } else if value >= max {
        " (max)"
    } else {
        ""
    }
}

/// Current derived values, one per line, flagged when they sit on a bound.
///
/// Empty while the simulation is disabled or has never been activated.
#[must_use]
pub fn status(managed: &ManagedSimulation) -> String {
    if !managed.enabled() {
        return String::new();
    }
    let Some(values) = managed.derived() else {
        return String::new();
    };
    DerivedParam::ALL
        .iter()
        .map(|&param| {
            let decimals = param.decimals();
            let value = round_to_decimals(values.get(param), decimals);
            let (min, max) = managed.range().bounds(param);
            format!(
                "{}: {value:.prec$}{}",
                param.label(),
                bound_marker(value, min, max),
                prec = decimals as usize
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Re-read painted rigidity, drag, and gravity from the host and report drift.
///
/// Empty when everything is within range.
pub fn advisories(managed: &ManagedSimulation) -> Result<Vec<Advisory>, HostError> {
    let accessor = managed.accessor();
    let limits = managed.limits();
    let mut out = Vec::new();
    if accessor.get_bool(BoolParam::UsePaintedRigidity)? {
        out.push(Advisory::PaintedRigidityActive);
    }
    out.extend(check_drag(accessor.get_float(FloatParam::Drag)?, limits));
    out.extend(check_gravity(
        accessor.get_float(FloatParam::GravityMultiplier)?,
        limits,
    ));
    Ok(out)
}

/// Informational notices that persist since activation (painted-rigidity change, caps).
#[must_use]
pub fn notices(managed: &ManagedSimulation) -> Vec<Advisory> {
    let mut out = Vec::new();
    if managed.painted_rigidity_disabled() {
        out.push(Advisory::PaintedRigidityDisabled);
    }
    out.extend(managed.capped().iter().cloned());
    out
}

/// Join notices with a blank line between them.
#[must_use]
pub fn render(advisories: &[Advisory]) -> String {
    advisories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full advisory text: live drift first, then standing notices.
///
/// When painted rigidity is switched back on in the host the standing
/// "has been disabled" notice is dropped in favour of the warning.
pub fn advisory_text(managed: &ManagedSimulation) -> Result<String, HostError> {
    let live = advisories(managed)?;
    let painted_active = live.contains(&Advisory::PaintedRigidityActive);
    let mut all = live;
    all.extend(
        notices(managed)
            .into_iter()
            .filter(|notice| !(painted_active && *notice == Advisory::PaintedRigidityDisabled)),
    );
    Ok(render(&all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryHost, SimParams};
    use crate::range::RangeField;

    fn activated(params: SimParams) -> (MemoryHost, ManagedSimulation) {
        let host = MemoryHost::new();
        let id = host.insert("hair", "Hair", "CustomHairItem", params);
        let mut managed =
            ManagedSimulation::new(id.clone(), "Hair", host.accessor(&id), OverrideLimits::default());
        managed.activate().expect("activate");
        (host, managed)
    }

    fn in_range() -> SimParams {
        SimParams {
            use_painted_rigidity: false,
            weight: 1.0,
            drag: 0.1,
            gravity_multiplier: 1.0,
            main_rigidity: 0.02,
            tip_rigidity: 0.002,
            style_cling: 0.5,
        }
    }

    #[test]
    fn drag_checks_report_direction() {
        let limits = OverrideLimits::default();
        assert_eq!(check_drag(0.1, &limits), None);
        assert_eq!(check_drag(0.0504, &limits), None);
        let high = check_drag(0.45, &limits).expect("high");
        assert_eq!(
            high.to_string(),
            "Drag 0.45 seems high. Recommended value: between 0.05 and 0.3."
        );
        let low = check_gravity(0.5, &limits).expect("low");
        assert_eq!(
            low.to_string(),
            "Gravity Multiplier 0.5 seems low. Recommended value: 1.000"
        );
    }

    #[test]
    fn status_marks_bounds_and_skips_degenerate_pairs() {
        let (_host, mut managed) = activated(in_range());
        managed.evaluate(90.0).expect("evaluate");
        assert_eq!(
            status(&managed),
            "Main rigidity: 0.020 (max)\nTip rigidity: 0.0020 (max)\nStyle cling: 0.50"
        );

        managed.edit_range(RangeField::MinStyleCling, 0.1);
        managed.evaluate(-90.0).expect("evaluate");
        assert_eq!(
            status(&managed),
            "Main rigidity: 0.002 (min)\nTip rigidity: 0.0000 (min)\nStyle cling: 0.10 (min)"
        );
    }

    #[test]
    fn status_is_empty_when_disabled() {
        let (_host, mut managed) = activated(in_range());
        managed.set_enabled(false);
        assert!(status(&managed).is_empty());
    }

    #[test]
    fn advisories_empty_when_in_range() {
        let (_host, managed) = activated(in_range());
        assert!(advisories(&managed).expect("advisories").is_empty());
        assert!(advisory_text(&managed).expect("text").is_empty());
    }

    #[test]
    fn advisories_track_host_drift_after_activation() {
        let (host, managed) = activated(in_range());
        host.set_param(managed.id(), FloatParam::Drag, 0.6);
        host.set_painted_rigidity(managed.id(), true);
        let found = advisories(&managed).expect("advisories");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(Advisory::is_drift));
        assert!(found.contains(&Advisory::PaintedRigidityActive));
    }

    #[test]
    fn advisory_text_combines_drift_and_notices() {
        let (host, managed) = activated(SimParams {
            use_painted_rigidity: true,
            main_rigidity: 0.4,
            ..in_range()
        });
        let text = advisory_text(&managed).expect("text");
        assert_eq!(
            text,
            "Painted rigidity has been disabled for the selected simulation.\n\n\
             Main rigidity 0.4 exceeds the supported maximum; capped to 0.1."
        );

        host.set_painted_rigidity(managed.id(), true);
        let text = advisory_text(&managed).expect("text");
        assert!(text.starts_with("Use Painted Rigidity must be disabled"));
        assert!(!text.contains("has been disabled"));
    }
}
