//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during retrieval and perturbation
//! - persisted through the result store
//! - reloaded later for aggregation or comparisons

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Solar illumination state of a pixel, derived from the sun zenith angle and
/// the availability of the 3.7µm channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Day,
    Twilight,
    Night,
}

/// The closed set of surface temperature retrieval algorithms.
///
/// `Sst*` is the open-water (Arctic SST) family, `Ist` the ice retrieval, and
/// `Mizt*` the marginal-ice-zone blend used in the water/ice transition band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    SstDay,
    SstNight,
    SstTwilight,
    Ist,
    MiztDay,
    MiztNight,
    MiztTwilight,
}

impl Algorithm {
    /// All algorithms, in reporting order.
    pub const ALL: [Algorithm; 7] = [
        Algorithm::SstDay,
        Algorithm::SstNight,
        Algorithm::SstTwilight,
        Algorithm::Ist,
        Algorithm::MiztDay,
        Algorithm::MiztNight,
        Algorithm::MiztTwilight,
    ];

    /// Stable lowercase label, used as the persisted algorithm name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::SstDay => "sst_day",
            Algorithm::SstNight => "sst_night",
            Algorithm::SstTwilight => "sst_twilight",
            Algorithm::Ist => "ist",
            Algorithm::MiztDay => "mizt_day",
            Algorithm::MiztNight => "mizt_night",
            Algorithm::MiztTwilight => "mizt_twilight",
        }
    }

    /// Parse a persisted or CLI-supplied algorithm label.
    pub fn parse(name: &str) -> Result<Algorithm, AppError> {
        let wanted = name.trim().to_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Algorithm::ALL.iter().map(|a| a.name()).collect();
                AppError::input(format!(
                    "Unknown algorithm '{name}'. Must be one of '{}'.",
                    known.join("', '")
                ))
            })
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One pixel of swath input, as produced by an instrument reader or the
/// synthetic scene generator.
///
/// `t11` and `t12` are mandatory for every retrieval. `t37` uses `NaN` as the
/// "channel absent" sentinel because that is exactly how it flows through the
/// night formulas and the perturbation epsilons.
#[derive(Debug, Clone, Copy)]
pub struct PixelObservation {
    /// ~11µm brightness temperature (K). Required.
    pub t11: f64,
    /// ~12µm brightness temperature (K). Required.
    pub t12: f64,
    /// ~3.7µm brightness temperature (K). `NaN` when the channel is absent.
    pub t37: f64,
    pub sun_zenith_angle: f64,
    pub sat_zenith_angle: f64,
    pub lat: f64,
    pub lon: f64,
    /// Instrument cloud mask value. Only 1 (clear) and 4 (probably clear)
    /// pixels are retrieved.
    pub cloud_mask: u8,
    /// Sea-ice fraction, when the mask provides one.
    pub ice_fraction: Option<f64>,
    /// Climatology estimate of the expected surface temperature. Falls back
    /// to `t11` when unavailable.
    pub t_clim: Option<f64>,
}

impl PixelObservation {
    /// Climatology temperature with the documented `t11` fallback.
    pub fn climatology(&self) -> f64 {
        self.t_clim.unwrap_or(self.t11)
    }
}

/// One Monte Carlo draw: the per-channel offsets that were applied and the
/// surface temperature the perturbed pixel retrieved to.
///
/// The algorithm is recorded per draw because noise can flip the physical
/// classification near a band boundary, so it may differ from the truth
/// pixel's algorithm.
#[derive(Debug, Clone, Copy)]
pub struct PerturbationSample {
    pub algorithm: Algorithm,
    pub epsilon_11: f64,
    pub epsilon_12: f64,
    /// `NaN` when the 3.7µm channel is absent.
    pub epsilon_37: f64,
    pub surface_temp: f64,
}

/// A full `pst run` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub satellite: String,
    pub coefficients_path: PathBuf,
    pub sigmas_path: PathBuf,
    pub database_path: PathBuf,
    /// Synthetic scene dimensions.
    pub rows: usize,
    pub cols: usize,
    /// Requested Monte Carlo draws per pixel. The stored ensemble per pixel is
    /// at most this large (invalid draws are discarded).
    pub perturbations: usize,
    /// Base seed; each pixel derives its own seed from this and its grid
    /// position, so reruns are exactly reproducible.
    pub seed: u64,
}
