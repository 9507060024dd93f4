//! `polar-st` library crate.
//!
//! The binary (`pst`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future swath readers, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod calib;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod perturb;
pub mod report;
pub mod retrieval;
pub mod store;
