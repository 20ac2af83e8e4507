use serde::{Deserialize, Serialize};

use crate::error::SiError;

/// Acquisition geometry for one spectroscopy slice: spatial resolution,
/// spectral points per voxel, and which slice of a multi-slice file to read.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    points: usize,
    slice_index: usize,
}

impl Grid {
    /// `slice_index` is 1-based, matching the scanner's slice numbering.
    pub fn new(rows: usize, cols: usize, points: usize, slice_index: usize) -> Result<Self, SiError> {
        // the acquisition has only ever produced square grids
        if rows != cols {
            return Err(SiError::Configuration { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            points,
            slice_index,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn slice_index(&self) -> usize {
        self.slice_index
    }

    pub fn n_pixels(&self) -> usize {
        self.rows * self.cols
    }

    /// f32 sample count of one slice (real + imaginary per channel per pixel)
    pub fn samples_per_slice(&self) -> usize {
        self.n_pixels() * 2 * self.points
    }

    /// byte offset of this grid's slice within the raw file
    pub fn slice_offset(&self) -> u64 {
        (self.n_pixels() * self.points * 4 * 2) as u64 * self.slice_index.saturating_sub(1) as u64
    }
}

impl Default for Grid {
    // the stock protocol: 24x24 spatial grid, 1024 spectral points, slice 1
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 24,
            points: 1024,
            slice_index: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_grids_only() {
        assert!(Grid::new(24, 24, 1024, 1).is_ok());
        assert!(Grid::new(16, 16, 512, 3).is_ok());
        let err = Grid::new(24, 16, 1024, 1).unwrap_err();
        assert!(matches!(err, SiError::Configuration { rows: 24, cols: 16 }));
    }

    #[test]
    fn slice_offsets() {
        let g = Grid::new(24, 24, 1024, 1).unwrap();
        assert_eq!(g.slice_offset(), 0);
        let g = Grid::new(24, 24, 1024, 2).unwrap();
        assert_eq!(g.slice_offset(), 24 * 24 * 1024 * 8);
        assert_eq!(g.samples_per_slice(), 24 * 24 * 2 * 1024);
    }
}
