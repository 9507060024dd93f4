//! Row-major 2-D grid of pixel observations.

use crate::domain::PixelObservation;

/// One instrument scene: a rectangular grid of pixels plus the satellite that
/// observed it.
#[derive(Debug, Clone)]
pub struct SwathGrid {
    satellite: String,
    rows: usize,
    cols: usize,
    pixels: Vec<PixelObservation>,
}

impl SwathGrid {
    /// Build a grid from row-major pixel storage.
    ///
    /// Panics in debug builds if the pixel count does not match the
    /// dimensions; construction sites are all in-crate.
    pub fn new(satellite: impl Into<String>, rows: usize, cols: usize, pixels: Vec<PixelObservation>) -> Self {
        debug_assert_eq!(pixels.len(), rows * cols);
        Self {
            satellite: satellite.into(),
            rows,
            cols,
            pixels,
        }
    }

    pub fn satellite(&self) -> &str {
        &self.satellite
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One row of pixels, in scan order.
    pub fn row(&self, row: usize) -> &[PixelObservation] {
        let start = row * self.cols;
        &self.pixels[start..start + self.cols]
    }
}
