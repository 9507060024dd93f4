//! Persistence of truth retrievals and their perturbation ensembles.
//!
//! The store owns the SQLite connection and an explicit name-to-id cache;
//! nothing in here is process-global. Records are strongly typed: field
//! presence and types are enforced at this boundary, not at call time.

pub mod db;
pub mod records;

pub use db::ResultStore;
pub use records::{Covariate, DeltaRow, PerturbationRecord, QueryFilter, SwathRecord};
