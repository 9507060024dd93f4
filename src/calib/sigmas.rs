//! Per-satellite, per-channel instrument noise (NEdT) standard deviations.

use std::path::Path;

use crate::calib::table::Table;
use crate::error::AppError;

/// Noise standard deviations for the three infrared channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSigmaSet {
    pub sigma_11: f64,
    pub sigma_12: f64,
    pub sigma_37: f64,
}

impl NoiseSigmaSet {
    pub fn load(path: &Path, satellite: &str) -> Result<NoiseSigmaSet, AppError> {
        let table = Table::load(path)?;
        NoiseSigmaSet::from_table(&table, satellite)
    }

    pub fn from_table(table: &Table, satellite: &str) -> Result<NoiseSigmaSet, AppError> {
        let row = table.lookup(satellite)?;
        let sigmas = NoiseSigmaSet {
            sigma_11: row.f64("sigma_11")?,
            sigma_12: row.f64("sigma_12")?,
            sigma_37: row.f64("sigma_37")?,
        };
        for (name, sigma) in [
            ("sigma_11", sigmas.sigma_11),
            ("sigma_12", sigmas.sigma_12),
            ("sigma_37", sigmas.sigma_37),
        ] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(AppError::input(format!(
                    "Satellite '{satellite}' has invalid noise {name} = {sigma}."
                )));
            }
        }
        Ok(sigmas)
    }
}
