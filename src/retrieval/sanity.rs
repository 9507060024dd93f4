//! Physical-plausibility check on a computed surface temperature.

/// Lowest physically meaningful surface temperature (K).
pub const SURFACE_TEMP_MIN: f64 = 150.0;
/// Highest physically meaningful surface temperature (K).
pub const SURFACE_TEMP_MAX: f64 = 350.0;

/// Validate a computed surface temperature against the observed channels.
///
/// Returns the temperature unchanged when plausible, `NaN` otherwise. `NaN`
/// is a first-class "no usable result" value: downstream code skips it and
/// persists nothing.
///
/// `t12` is part of the contract: a screen on large `t11 - t12` differences
/// (an ice fog indicator) belongs here but is not active.
pub fn sanity_check(t_surface: f64, t11: f64, _t12: f64) -> f64 {
    if t_surface < t11 {
        // Under these algorithms the surface cannot be colder than the
        // observed 11µm brightness temperature.
        return f64::NAN;
    }

    if t_surface < SURFACE_TEMP_MIN || t_surface > SURFACE_TEMP_MAX {
        return f64::NAN;
    }

    t_surface
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colder_than_t11_is_invalid() {
        assert!(sanity_check(260.9, 261.0, 260.0).is_nan());
        assert!(sanity_check(200.0, 271.0, 270.0).is_nan());
    }

    #[test]
    fn out_of_physical_range_is_invalid() {
        assert!(sanity_check(149.9, 100.0, 100.0).is_nan());
        assert!(sanity_check(350.1, 300.0, 299.0).is_nan());
    }

    #[test]
    fn plausible_values_pass_through_unchanged() {
        assert_eq!(sanity_check(261.0, 261.0, 260.5), 261.0);
        assert_eq!(sanity_check(273.4, 271.0, 270.2), 273.4);
        assert_eq!(sanity_check(150.0, 150.0, 149.0), 150.0);
        assert_eq!(sanity_check(350.0, 300.0, 299.0), 350.0);
    }

    #[test]
    fn nan_input_stays_nan() {
        assert!(sanity_check(f64::NAN, 261.0, 260.0).is_nan());
    }
}
