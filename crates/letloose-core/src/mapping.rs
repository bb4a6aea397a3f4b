//! Angle window to interpolation factor mapping.

/// Map `angle` from `[lower, upper]` onto `[0, 1]`, clamped at both ends.
///
/// A collapsed window (`lower >= upper`) and NaN angles map to `0.0`.
#[must_use]
pub fn normalize(angle: f32, lower: f32, upper: f32) -> f32 {
    if angle.is_nan() {
        return 0.0;
    }
    let span = upper - lower;
    if span <= 0.0 {
        return 0.0;
    }
    ((angle - lower) / span).clamp(0.0, 1.0)
}

#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Round half away from zero to `places` decimal places.
#[must_use]
pub fn round_to_decimals(value: f32, places: u32) -> f32 {
    let factor = 10f32.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_outside_window() {
        assert_eq!(normalize(-90.0, 45.0, 90.0), 0.0);
        assert_eq!(normalize(45.0, 45.0, 90.0), 0.0);
        assert_eq!(normalize(90.0, 45.0, 90.0), 1.0);
        assert_eq!(normalize(120.0, 45.0, 90.0), 1.0);
        assert!((normalize(67.5, 45.0, 90.0) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn normalize_is_monotonic() {
        let mut previous = 0.0;
        let mut angle = -90.0;
        while angle <= 90.0 {
            let f = normalize(angle, -30.0, 60.0);
            assert!(f >= previous, "factor decreased at {angle}");
            assert!((0.0..=1.0).contains(&f));
            previous = f;
            angle += 0.25;
        }
    }

    #[test]
    fn collapsed_window_stays_at_lower_bound() {
        assert_eq!(normalize(10.0, 20.0, 20.0), 0.0);
        assert_eq!(normalize(20.0, 20.0, 20.0), 0.0);
        assert_eq!(normalize(30.0, 20.0, 20.0), 0.0);
    }

    #[test]
    fn nan_angle_maps_to_zero() {
        assert_eq!(normalize(f32::NAN, 0.0, 90.0), 0.0);
    }

    #[test]
    fn rounding_matches_precision() {
        assert_eq!(round_to_decimals(0.012_49, 3), 0.012);
        assert_eq!(round_to_decimals(0.012_51, 3), 0.013);
        assert_eq!(round_to_decimals(0.333_33, 2), 0.33);
        assert_eq!(round_to_decimals(0.002_26, 4), 0.0023);
    }
}
