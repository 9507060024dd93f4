//! Per-regime surface temperature formulas and the retrieval dispatch.
//!
//! Sources:
//!
//! - IST split-window form from Key et al 1997
//! - Arctic SST day/night from PLBorgne 2010
//! - MIZT water/ice blend from Vincent et al 2008
//!
//! The twilight and MIZT blends are literal linear ramps, not normalized
//! convex combinations; at the very edges of their input domains they can
//! extrapolate slightly outside the two blended values. They are preserved
//! exactly as published.

use crate::calib::CoefficientSet;
use crate::domain::Algorithm;
use crate::error::AppError;
use crate::retrieval::sanity::sanity_check;
use crate::retrieval::{MIZT_LOWER, MIZT_UPPER};

/// Atmospheric path-length term: `1 / cos(radians(angle)) - 1`.
///
/// Zero at nadir, growing with the satellite zenith angle.
pub fn s_teta(sat_zenith_angle: f64) -> f64 {
    1.0 / sat_zenith_angle.to_radians().cos() - 1.0
}

/// Compute the surface temperature for one pixel with the given algorithm,
/// then sanity-check it.
///
/// Returns `NaN` when the sanity check rejects the value; that is the
/// "no usable result" signal, not an error. Errors are reserved for internal
/// inconsistency between the selector and this dispatch.
pub fn retrieve(
    algorithm: Algorithm,
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t37: f64,
    t_clim: f64,
    sun_zenith_angle: f64,
    sat_zenith_angle: f64,
) -> Result<f64, AppError> {
    let s_teta = s_teta(sat_zenith_angle);

    let st = match algorithm {
        Algorithm::SstDay => sea_surface_temperature_day(coeff, t11, t12, t_clim, s_teta),
        Algorithm::SstNight => sea_surface_temperature_night(coeff, t11, t12, t37, s_teta)?,
        Algorithm::SstTwilight => {
            sea_surface_temperature_twilight(coeff, t11, t12, t37, t_clim, s_teta, sun_zenith_angle)?
        }
        Algorithm::Ist => ice_surface_temperature(coeff, t11, t12, s_teta),
        Algorithm::MiztDay => marginal_ice_zone_temperature_day(coeff, t11, t12, t_clim, s_teta),
        Algorithm::MiztNight => marginal_ice_zone_temperature_night(coeff, t11, t12, t37, s_teta)?,
        Algorithm::MiztTwilight => marginal_ice_zone_temperature_twilight(
            coeff,
            t11,
            t12,
            t37,
            t_clim,
            s_teta,
            sun_zenith_angle,
        )?,
    };

    Ok(sanity_check(st, t11, t12))
}

/// Ice surface temperature: split-window with a t11-banded coefficient
/// quadruple.
pub fn ice_surface_temperature(coeff: &CoefficientSet, t11: f64, t12: f64, s_teta: f64) -> f64 {
    let band = coeff.ist_band(t11);
    band.a + band.b * t11 + band.c * (t11 - t12) + band.d * ((t11 - t12) * s_teta)
}

/// Arctic SST, day form.
pub fn sea_surface_temperature_day(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t_clim: f64,
    s_teta: f64,
) -> f64 {
    let c = &coeff.sst_day;
    (c.a + c.b * s_teta) * t11 + (c.c + c.d * s_teta + c.e * t_clim) * (t11 - t12) + c.f + c.g * s_teta
}

/// Arctic SST, night form. Requires t37; the selector never picks a night
/// algorithm without it, so a `NaN` t37 here means the selector and this
/// dispatch have drifted apart.
pub fn sea_surface_temperature_night(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t37: f64,
    s_teta: f64,
) -> Result<f64, AppError> {
    if t37.is_nan() {
        return Err(AppError::internal(
            "SST night algorithm reached without a 3.7µm channel.",
        ));
    }
    let c = &coeff.sst_night;
    Ok((c.a + c.b * s_teta) * t37
        + (c.c + c.d * s_teta) * (t11 - t12)
        + c.e
        + c.f * s_teta
        + c.correction(s_teta))
}

/// Twilight: day and night values scaled linearly against the sun zenith
/// angle over the 90°-110° band.
fn surface_temperature_twilight(st_day: f64, st_night: f64, sun_zenith_angle: f64) -> f64 {
    (sun_zenith_angle - 110.0) * (-0.05) * st_day + (sun_zenith_angle - 90.0) * 0.05 * st_night
}

fn sea_surface_temperature_twilight(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t37: f64,
    t_clim: f64,
    s_teta: f64,
    sun_zenith_angle: f64,
) -> Result<f64, AppError> {
    let day = sea_surface_temperature_day(coeff, t11, t12, t_clim, s_teta);
    let night = sea_surface_temperature_night(coeff, t11, t12, t37, s_teta)?;
    Ok(surface_temperature_twilight(day, night, sun_zenith_angle))
}

/// MIZT: IST and SST scaled linearly against t11's position within the
/// transition band.
fn marginal_ice_zone_temperature(coeff: &CoefficientSet, t11: f64, t12: f64, sst: f64, s_teta: f64) -> f64 {
    let ist = ice_surface_temperature(coeff, t11, t12, s_teta);
    (t11 - MIZT_UPPER) * (-0.5) * ist + (t11 - MIZT_LOWER) * 0.5 * sst
}

fn marginal_ice_zone_temperature_day(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t_clim: f64,
    s_teta: f64,
) -> f64 {
    let sst = sea_surface_temperature_day(coeff, t11, t12, t_clim, s_teta);
    marginal_ice_zone_temperature(coeff, t11, t12, sst, s_teta)
}

fn marginal_ice_zone_temperature_night(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t37: f64,
    s_teta: f64,
) -> Result<f64, AppError> {
    let sst = sea_surface_temperature_night(coeff, t11, t12, t37, s_teta)?;
    Ok(marginal_ice_zone_temperature(coeff, t11, t12, sst, s_teta))
}

fn marginal_ice_zone_temperature_twilight(
    coeff: &CoefficientSet,
    t11: f64,
    t12: f64,
    t37: f64,
    t_clim: f64,
    s_teta: f64,
    sun_zenith_angle: f64,
) -> Result<f64, AppError> {
    let day = marginal_ice_zone_temperature_day(coeff, t11, t12, t_clim, s_teta);
    let night = marginal_ice_zone_temperature_night(coeff, t11, t12, t37, s_teta)?;
    Ok(surface_temperature_twilight(day, night, sun_zenith_angle))
}
