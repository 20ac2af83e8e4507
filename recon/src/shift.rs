use std::f32::consts::PI;

use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};
use si_data::error::SiError;
use si_data::grid::Grid;

/// Sub-voxel shift correction settings. The defaults are the scanner's stock
/// calibration offsets, in voxel units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ShiftSpec {
    pub apply_shift: bool,
    pub vertical_shift: f32,
    pub horizontal_shift: f32,
    /// radians; any non-zero value is rejected by the corrector
    pub rotation_angle: f32,
}

impl Default for ShiftSpec {
    fn default() -> Self {
        Self {
            apply_shift: true,
            vertical_shift: 1.49464,
            horizontal_shift: -1.60098,
            rotation_angle: 0.0,
        }
    }
}

/// Per-pixel phase ramp realizing the sub-voxel translation in k-space.
///
/// With `apply_shift` off this is the all-ones identity mask. The legacy tool
/// builds a meshgrid and transposes the product; the transpose folds into
/// direct `(row, col)` indexing here, with the horizontal shift running along
/// rows and the vertical shift along columns.
pub fn shift_map(grid: &Grid, shift: &ShiftSpec) -> Result<Array2<Complex<f32>>, SiError> {
    if shift.apply_shift && shift.rotation_angle != 0.0 {
        return Err(SiError::UnsupportedRotation {
            angle: shift.rotation_angle,
        });
    }
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut map = Array2::from_elem((rows, cols), Complex::new(1.0f32, 0.0));
    if !shift.apply_shift {
        return Ok(map);
    }
    for r in 0..rows {
        let rr = (r as f32 - rows as f32 / 2.0) * shift.horizontal_shift / rows as f32;
        for c in 0..cols {
            let cc = (c as f32 - cols as f32 / 2.0) * shift.vertical_shift / cols as f32;
            map[[r, c]] = Complex::from_polar(1.0, (rr + cc) * 2.0 * PI);
        }
    }
    Ok(map)
}
