//! Synthetic arctic scene generation.
//!
//! Stands in for the out-of-scope instrument readers so the full pipeline is
//! exercisable end to end. The scene is deterministic for a given seed and
//! deliberately spans all three t11 bands (ice, marginal ice zone, open
//! water) and all three day states, so every retrieval algorithm gets hit.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::grid::SwathGrid;
use crate::domain::PixelObservation;
use crate::error::AppError;

/// Fraction of pixels with no usable 3.7µm channel.
const T37_MISSING_PROB: f64 = 0.2;
/// Fraction of pixels masked out as cloudy.
const CLOUDY_PROB: f64 = 0.15;

/// Generate a `rows x cols` synthetic scene for one satellite.
pub fn generate_scene(
    satellite: &str,
    rows: usize,
    cols: usize,
    seed: u64,
) -> Result<SwathGrid, AppError> {
    if rows == 0 || cols == 0 {
        return Err(AppError::input("Scene dimensions must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        for _col in 0..cols {
            // Sweep the scene from cold ice at the top rows toward open water
            // at the bottom, with per-pixel scatter so the marginal ice zone
            // band actually gets populated.
            let sweep = row as f64 / rows.max(1) as f64;
            let t11 = 245.0 + 32.0 * sweep + rng.gen_range(-4.0..4.0);
            let t12 = t11 - rng.gen_range(0.1..1.2);
            let t37 = if rng.gen_bool(T37_MISSING_PROB) {
                f64::NAN
            } else {
                t11 - rng.gen_range(-0.5..1.5)
            };

            let sun_zenith_angle = rng.gen_range(60.0..130.0);
            let sat_zenith_angle = rng.gen_range(0.0..60.0);

            let cloud_mask = if rng.gen_bool(CLOUDY_PROB) {
                2
            } else if rng.gen_bool(0.5) {
                1
            } else {
                4
            };

            let ice_fraction = if t11 < 268.95 {
                Some(1.0)
            } else if t11 < 270.95 {
                Some(rng.gen_range(0.1..0.9))
            } else {
                None
            };

            pixels.push(PixelObservation {
                t11,
                t12,
                t37,
                sun_zenith_angle,
                sat_zenith_angle,
                lat: rng.gen_range(66.0..85.0),
                lon: rng.gen_range(-40.0..40.0),
                cloud_mask,
                ice_fraction,
                t_clim: None,
            });
        }
    }

    Ok(SwathGrid::new(satellite, rows, cols, pixels))
}
