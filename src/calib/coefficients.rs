//! Per-satellite retrieval coefficients.
//!
//! One immutable [`CoefficientSet`] is loaded per run, keyed by satellite id:
//!
//! - three IST coefficient quadruples, picked by t11 band
//! - the SST day coefficients
//! - the SST night coefficients plus the angle-dependent night correction

use std::path::Path;

use crate::calib::table::Table;
use crate::error::AppError;

/// One IST coefficient quadruple (split-window form, one per t11 band).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IstBand {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

/// Coefficients for the SST day algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SstDayCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub g: f64,
}

/// Coefficients for the SST night algorithm, including the gain/offset pair
/// for the viewing-angle correction term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SstNightCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub gain: f64,
    pub offset: f64,
}

impl SstNightCoefficients {
    /// Night correction term: `gain * s_teta + offset`.
    pub fn correction(&self, s_teta: f64) -> f64 {
        self.gain * s_teta + self.offset
    }
}

/// Immutable calibration parameters for one satellite.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    pub satellite: String,
    pub ist_below_240: IstBand,
    pub ist_240_to_260: IstBand,
    pub ist_above_260: IstBand,
    pub sst_day: SstDayCoefficients,
    pub sst_night: SstNightCoefficients,
}

impl CoefficientSet {
    /// Load the coefficient table and pick out one satellite's row.
    ///
    /// An unknown satellite id fails here, before any per-pixel work begins.
    pub fn load(path: &Path, satellite: &str) -> Result<CoefficientSet, AppError> {
        let table = Table::load(path)?;
        CoefficientSet::from_table(&table, satellite)
    }

    pub fn from_table(table: &Table, satellite: &str) -> Result<CoefficientSet, AppError> {
        let row = table.lookup(satellite)?;
        Ok(CoefficientSet {
            satellite: row.satellite().to_string(),
            ist_below_240: IstBand {
                a: row.f64("a_ist_lss240")?,
                b: row.f64("b_ist_lss240")?,
                c: row.f64("c_ist_lss240")?,
                d: row.f64("d_ist_lss240")?,
            },
            ist_240_to_260: IstBand {
                a: row.f64("a_ist_range240_260")?,
                b: row.f64("b_ist_range240_260")?,
                c: row.f64("c_ist_range240_260")?,
                d: row.f64("d_ist_range240_260")?,
            },
            ist_above_260: IstBand {
                a: row.f64("a_ist_grt260")?,
                b: row.f64("b_ist_grt260")?,
                c: row.f64("c_ist_grt260")?,
                d: row.f64("d_ist_grt260")?,
            },
            sst_day: SstDayCoefficients {
                a: row.f64("a_sst_day")?,
                b: row.f64("b_sst_day")?,
                c: row.f64("c_sst_day")?,
                d: row.f64("d_sst_day")?,
                e: row.f64("e_sst_day")?,
                f: row.f64("f_sst_day")?,
                g: row.f64("g_sst_day")?,
            },
            sst_night: SstNightCoefficients {
                a: row.f64("a_sst_night")?,
                b: row.f64("b_sst_night")?,
                c: row.f64("c_sst_night")?,
                d: row.f64("d_sst_night")?,
                e: row.f64("e_sst_night")?,
                f: row.f64("f_sst_night")?,
                gain: row.f64("gain_sst_night")?,
                offset: row.f64("offset_sst_night")?,
            },
        })
    }

    /// IST coefficient band for a given t11: `<240`, `[240, 260)`, `>=260`.
    pub fn ist_band(&self, t11: f64) -> IstBand {
        if t11 < 240.0 {
            self.ist_below_240
        } else if t11 < 260.0 {
            self.ist_240_to_260
        } else {
            self.ist_above_260
        }
    }
}
