//! Monte Carlo perturbation of the input channels.
//!
//! Each draw adds Gaussian instrument noise to the three brightness
//! temperatures and re-runs the full selection + retrieval + sanity chain on
//! the perturbed pixel. Re-running selection is intentional: noise can move a
//! pixel across a band boundary and flip its physical classification, and the
//! ensemble is supposed to capture that.
//!
//! Draws are seeded per pixel, so ensembles are exactly reproducible across
//! runs and independent of any parallelism in the caller.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::calib::{CoefficientSet, NoiseSigmaSet};
use crate::domain::PerturbationSample;
use crate::error::AppError;
use crate::retrieval::{retrieve, select_algorithm};

/// Derive a pixel's RNG seed from the run's base seed and the pixel's
/// position in the row-major grid scan.
pub fn pixel_seed(base_seed: u64, pixel_counter: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    base_seed.hash(&mut hasher);
    pixel_counter.hash(&mut hasher);
    hasher.finish()
}

/// Draw up to `n` perturbed retrievals for one pixel.
///
/// Deterministic for a given `seed`. Draws whose perturbed temperature fails
/// the sanity check are discarded, so the returned ensemble has at most `n`
/// samples. A zero-sigma set degenerates to `n` copies of the truth
/// retrieval.
#[allow(clippy::too_many_arguments)]
pub fn perturb(
    coeff: &CoefficientSet,
    n: usize,
    t11: f64,
    t12: f64,
    t37: f64,
    t_clim: f64,
    sigmas: &NoiseSigmaSet,
    sun_zenith_angle: f64,
    sat_zenith_angle: f64,
    seed: u64,
) -> Result<Vec<PerturbationSample>, AppError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let normal_11 = noise_distribution(t11, sigmas.sigma_11)?;
    let normal_12 = noise_distribution(t12, sigmas.sigma_12)?;
    let normal_37 = if t37.is_nan() {
        None
    } else {
        Some(noise_distribution(t37, sigmas.sigma_37)?)
    };

    let mut samples = Vec::with_capacity(n);
    for _ in 0..n {
        let perturbed_t11 = normal_11.sample(&mut rng);
        let perturbed_t12 = normal_12.sample(&mut rng);
        // An absent 3.7µm channel stays absent under perturbation.
        let perturbed_t37 = match &normal_37 {
            Some(normal) => normal.sample(&mut rng),
            None => f64::NAN,
        };

        let algorithm = select_algorithm(sun_zenith_angle, perturbed_t11, perturbed_t37);
        let surface_temp = retrieve(
            algorithm,
            coeff,
            perturbed_t11,
            perturbed_t12,
            perturbed_t37,
            t_clim,
            sun_zenith_angle,
            sat_zenith_angle,
        )?;

        if surface_temp.is_nan() {
            continue;
        }

        samples.push(PerturbationSample {
            algorithm,
            epsilon_11: perturbed_t11 - t11,
            epsilon_12: perturbed_t12 - t12,
            epsilon_37: perturbed_t37 - t37,
            surface_temp,
        });
    }

    Ok(samples)
}

fn noise_distribution(mean: f64, sigma: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, sigma)
        .map_err(|e| AppError::input(format!("Noise distribution error (sigma = {sigma}): {e}")))
}
