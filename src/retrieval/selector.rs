//! Algorithm selection.
//!
//! Pure functions of the pixel's sun zenith angle, t11, and t37 presence.
//! The day-state split is applied first; the t11 band then decides between
//! open water, ice, and the marginal-ice-zone blend.

use crate::domain::{Algorithm, DayState};
use crate::retrieval::{DAY_MAX_ANGLE, MIZT_LOWER, MIZT_UPPER, NIGHT_MIN_ANGLE};

/// Day/twilight/night classification.
///
/// A pixel with an absent 3.7µm channel is always classified as day: the
/// night and twilight formulas need t37, and the day formulas do not.
pub fn day_state(sun_zenith_angle: f64, t37: f64) -> DayState {
    if sun_zenith_angle <= DAY_MAX_ANGLE || t37.is_nan() {
        DayState::Day
    } else if sun_zenith_angle < NIGHT_MIN_ANGLE {
        DayState::Twilight
    } else {
        DayState::Night
    }
}

/// Pick the retrieval algorithm for one pixel.
///
/// IST is selected for `t11 < 268.95` regardless of day state; the ice
/// retrieval uses no solar term.
pub fn select_algorithm(sun_zenith_angle: f64, t11: f64, t37: f64) -> Algorithm {
    let state = day_state(sun_zenith_angle, t37);

    if (MIZT_LOWER..MIZT_UPPER).contains(&t11) {
        match state {
            DayState::Day => Algorithm::MiztDay,
            DayState::Night => Algorithm::MiztNight,
            DayState::Twilight => Algorithm::MiztTwilight,
        }
    } else if t11 >= MIZT_UPPER {
        match state {
            DayState::Day => Algorithm::SstDay,
            DayState::Night => Algorithm::SstNight,
            DayState::Twilight => Algorithm::SstTwilight,
        }
    } else {
        Algorithm::Ist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_sun_angle_is_day_regardless_of_t37() {
        for t37 in [261.0, f64::NAN] {
            assert_eq!(day_state(20.0, t37), DayState::Day);
            assert_eq!(day_state(90.0, t37), DayState::Day);
        }
    }

    #[test]
    fn missing_t37_forces_day() {
        assert_eq!(day_state(120.0, f64::NAN), DayState::Day);
        assert_eq!(day_state(100.0, f64::NAN), DayState::Day);
    }

    #[test]
    fn twilight_band_is_90_to_110_exclusive() {
        assert_eq!(day_state(90.001, 261.0), DayState::Twilight);
        assert_eq!(day_state(109.999, 261.0), DayState::Twilight);
        assert_eq!(day_state(110.0, 261.0), DayState::Night);
        assert_eq!(day_state(130.0, 261.0), DayState::Night);
    }

    #[test]
    fn cold_pixel_is_ist() {
        assert_eq!(select_algorithm(20.0, 261.0, f64::NAN), Algorithm::Ist);
        // IST has no solar split.
        assert_eq!(select_algorithm(120.0, 261.0, 260.0), Algorithm::Ist);
    }

    #[test]
    fn warm_pixel_is_sst_by_day_state() {
        assert_eq!(select_algorithm(20.0, 271.0, f64::NAN), Algorithm::SstDay);
        assert_eq!(select_algorithm(100.0, 271.0, 270.0), Algorithm::SstTwilight);
        assert_eq!(select_algorithm(120.0, 271.0, 270.0), Algorithm::SstNight);
    }

    #[test]
    fn transition_band_is_mizt_by_day_state() {
        assert_eq!(select_algorithm(20.0, 269.0, f64::NAN), Algorithm::MiztDay);
        assert_eq!(select_algorithm(100.0, 269.0, 268.0), Algorithm::MiztTwilight);
        assert_eq!(select_algorithm(120.0, 269.0, 268.0), Algorithm::MiztNight);
    }

    #[test]
    fn mizt_band_is_inclusive_below_exclusive_above() {
        assert_eq!(select_algorithm(20.0, 268.95, f64::NAN), Algorithm::MiztDay);
        assert_eq!(select_algorithm(20.0, 270.95, f64::NAN), Algorithm::SstDay);
        assert_eq!(select_algorithm(20.0, 268.9499, f64::NAN), Algorithm::Ist);
    }

    #[test]
    fn selection_is_pure() {
        let first = select_algorithm(95.0, 270.0, 268.5);
        for _ in 0..10 {
            assert_eq!(select_algorithm(95.0, 270.0, 268.5), first);
        }
    }
}
