//! Per-satellite calibration parameters and instrument noise.
//!
//! Both tables share the same whitespace-delimited text format (see
//! [`table`]) and both are loaded exactly once, before any per-pixel work
//! begins, so that an unknown satellite id fails the run immediately.

pub mod coefficients;
pub mod sigmas;
pub mod table;

pub use coefficients::{CoefficientSet, IstBand, SstDayCoefficients, SstNightCoefficients};
pub use sigmas::NoiseSigmaSet;
pub use table::Table;
