//! Swath grids and the synthetic scene generator.
//!
//! Real instrument readers (HDF5/NetCDF swath files) live outside this crate;
//! anything that can produce a [`SwathGrid`] can feed the pipeline.

pub mod grid;
pub mod sample;

pub use grid::SwathGrid;
pub use sample::generate_scene;
