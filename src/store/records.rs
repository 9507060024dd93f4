//! Typed records and query shapes for the result store.

use chrono::NaiveDateTime;

use crate::domain::{Algorithm, PerturbationSample, PixelObservation};

/// One persisted truth retrieval: the pixel's observation context plus the
/// surface temperature it retrieved to. Written once, never updated.
#[derive(Debug, Clone)]
pub struct SwathRecord {
    pub satellite: String,
    pub surface_temp: f64,
    pub t11: f64,
    pub t12: f64,
    /// `NaN` (stored as NULL) when the channel is absent.
    pub t37: f64,
    pub sat_zenith_angle: f64,
    pub sun_zenith_angle: f64,
    pub ice_fraction: Option<f64>,
    pub cloud_mask: i64,
    pub datetime: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
}

impl SwathRecord {
    /// Build the persisted record for a pixel whose truth retrieval succeeded.
    pub fn new(
        satellite: &str,
        pixel: &PixelObservation,
        surface_temp: f64,
        datetime: NaiveDateTime,
    ) -> Self {
        SwathRecord {
            satellite: satellite.to_string(),
            surface_temp,
            t11: pixel.t11,
            t12: pixel.t12,
            t37: pixel.t37,
            sat_zenith_angle: pixel.sat_zenith_angle,
            sun_zenith_angle: pixel.sun_zenith_angle,
            ice_fraction: pixel.ice_fraction,
            cloud_mask: pixel.cloud_mask as i64,
            datetime,
            lat: pixel.lat,
            lon: pixel.lon,
        }
    }
}

/// One persisted Monte Carlo draw, linked to its swath record.
#[derive(Debug, Clone, Copy)]
pub struct PerturbationRecord {
    pub algorithm: Algorithm,
    pub epsilon_11: f64,
    pub epsilon_12: f64,
    /// `NaN` (stored as NULL) when the channel is absent.
    pub epsilon_37: f64,
    pub surface_temp: f64,
}

impl From<PerturbationSample> for PerturbationRecord {
    fn from(sample: PerturbationSample) -> Self {
        PerturbationRecord {
            algorithm: sample.algorithm,
            epsilon_11: sample.epsilon_11,
            epsilon_12: sample.epsilon_12,
            epsilon_37: sample.epsilon_37,
            surface_temp: sample.surface_temp,
        }
    }
}

/// Swath-side fields that can be projected alongside the temperature deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Covariate {
    T11,
    T12,
    T37,
    SunZenithAngle,
    SatZenithAngle,
    Lat,
    Lon,
    TruthTemp,
}

impl Covariate {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Covariate::T11 => "s.t_11",
            Covariate::T12 => "s.t_12",
            Covariate::T37 => "s.t_37",
            Covariate::SunZenithAngle => "s.sun_zenith_angle",
            Covariate::SatZenithAngle => "s.sat_zenith_angle",
            Covariate::Lat => "s.lat",
            Covariate::Lon => "s.lon",
            Covariate::TruthTemp => "s.surface_temp",
        }
    }
}

/// Filter for delta queries. All bounds are optional; ranges are half-open
/// `[low, high)` to match the retrieval band conventions.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub lat_range: Option<(f64, f64)>,
    /// Keep rows where `|sun_zenith - sat_zenith| <= limit`.
    pub angle_difference_limit: Option<f64>,
    pub algorithm: Option<Algorithm>,
    /// Applies to the truth surface temperature.
    pub temperature_range: Option<(f64, f64)>,
}

/// One query result row: `perturbed - truth`, plus the requested covariates
/// in projection order (`NaN` where the stored value was NULL).
#[derive(Debug, Clone)]
pub struct DeltaRow {
    pub delta: f64,
    pub covariates: Vec<f64>,
}
