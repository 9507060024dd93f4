//! Shared domain types for retrieval, perturbation, and persistence.

pub mod types;

pub use types::{Algorithm, DayState, PerturbationSample, PixelObservation, RunConfig};
