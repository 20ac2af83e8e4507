use log::debug;
use ndarray::{s, Array2, Array3};
use num_complex::Complex;
use rayon::prelude::*;

use si_data::error::SiError;
use si_data::grid::Grid;
use si_data::layout;
use si_data::siarray::SiData;

use crate::dft;
use crate::shift::{shift_map, ShiftSpec};

/// Reconstruction state for one SI slice: the raw sample matrix plus the
/// k-space volume derived from it. The volume is built on first use and
/// cached; it is never rebuilt or mutated afterwards.
pub struct SiVolume {
    grid: Grid,
    data: Array2<f32>,
    kspace: Option<Array3<f32>>,
}

impl SiVolume {
    pub fn from_file(si: &SiData) -> Result<Self, SiError> {
        Ok(Self::new(*si.grid(), si.sample_matrix()?))
    }

    /// `data` is the `(2*points, rows*cols)` sample matrix.
    pub fn new(grid: Grid, data: Array2<f32>) -> Self {
        Self {
            grid,
            data,
            kspace: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Spatially reconstructed volume in the disk-compatible packing:
    /// `(rows, cols, 2*points)` with real channels in `[0, points)` and
    /// imaginary channels in `[points, 2*points)` along the third axis.
    pub fn kspace(&mut self) -> &Array3<f32> {
        if self.kspace.is_none() {
            debug!(
                "building k-space volume, {}x{} grid, {} points",
                self.grid.rows(),
                self.grid.cols(),
                self.grid.points()
            );
            self.kspace = Some(build_kspace(&self.grid, &self.data));
        }
        self.kspace.as_ref().expect("k-space volume was just built")
    }

    /// Apply the sub-voxel shift correction and re-flatten to the
    /// `(2*points, rows*cols)` disk layout.
    ///
    /// Pure in its inputs: the cached volume is left untouched and repeated
    /// calls with the same settings agree.
    pub fn shift_corrected(&mut self, shift: &ShiftSpec) -> Result<Array2<f32>, SiError> {
        let map = shift_map(&self.grid, shift)?;
        let grid = self.grid;
        Ok(apply_shift_map(&grid, self.kspace(), &map))
    }
}

/// Per-channel spatial reconstruction: inverse 2D DFT of each spectral
/// channel's sample plane, zero-frequency centered, packed real-over-
/// imaginary along the third axis. Channels are independent, so the loop
/// fans out across threads.
pub fn build_kspace(grid: &Grid, data: &Array2<f32>) -> Array3<f32> {
    let (rows, cols, pts) = (grid.rows(), grid.cols(), grid.points());
    let channels: Vec<Array2<Complex<f32>>> = (0..pts)
        .into_par_iter()
        .map(|a| dft::fftshift2(&dft::ifft2(&channel_image(grid, data, a))))
        .collect();

    let mut kspace = Array3::<f32>::zeros((rows, cols, 2 * pts));
    for (a, chan) in channels.iter().enumerate() {
        kspace.slice_mut(s![.., .., a]).assign(&chan.mapv(|e| e.re));
        kspace
            .slice_mut(s![.., .., pts + a])
            .assign(&chan.mapv(|e| e.im));
    }
    kspace
}

/// complex `(rows, cols)` image for spectral channel `a` of the sample matrix
fn channel_image(grid: &Grid, data: &Array2<f32>, a: usize) -> Array2<Complex<f32>> {
    let pts = grid.points();
    let pixels: Vec<Complex<f32>> = data
        .row(a)
        .iter()
        .zip(data.row(pts + a).iter())
        .map(|(re, im)| Complex::new(*re, *im))
        .collect();
    layout::pixel_linear_to_grid(pixels, grid.rows(), grid.cols())
}

/// Multiply each channel of the packed volume by the phase mask, unwind the
/// builder's centering, transform forward, and stack the channels back into
/// the `(2*points, rows*cols)` disk layout. With the identity mask this is
/// the exact inverse of [`build_kspace`], scale constant 1.
fn apply_shift_map(
    grid: &Grid,
    kspace: &Array3<f32>,
    map: &Array2<Complex<f32>>,
) -> Array2<f32> {
    let (rows, cols, pts) = (grid.rows(), grid.cols(), grid.points());
    let corrected: Vec<Array2<Complex<f32>>> = (0..pts)
        .into_par_iter()
        .map(|a| {
            let re = kspace.slice(s![.., .., a]);
            let im = kspace.slice(s![.., .., pts + a]);
            let chan =
                Array2::from_shape_fn((rows, cols), |(r, c)| Complex::new(re[[r, c]], im[[r, c]]));
            dft::fft2(&dft::ifftshift2(&(&chan * map)))
        })
        .collect();

    let mut out = Array2::<f32>::zeros((2 * pts, rows * cols));
    for (a, chan) in corrected.iter().enumerate() {
        for (p, v) in layout::grid_to_pixel_linear(chan).iter().enumerate() {
            out[[a, p]] = v.re;
            out[[pts + a, p]] = v.im;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data(grid: &Grid) -> Array2<f32> {
        Array2::from_shape_fn((2 * grid.points(), grid.n_pixels()), |(i, j)| {
            ((i * 31 + j * 7) % 17) as f32 - 8.0
        })
    }

    #[test]
    fn kspace_shape_and_flat_channel() {
        let grid = Grid::new(4, 4, 2, 1).unwrap();
        // channel 0 is a constant 2.0 across k-space, channel 1 is zero
        let mut data = Array2::<f32>::zeros((4, 16));
        data.row_mut(0).fill(2.0);
        let mut vol = SiVolume::new(grid, data);
        let k = vol.kspace();
        assert_eq!(k.shape(), &[4, 4, 4]);
        // the inverse transform of a constant is an impulse, centered by the
        // shift at (rows/2, cols/2)
        assert!((k[[2, 2, 0]] - 2.0).abs() < 1e-5);
        assert!(k[[0, 0, 0]].abs() < 1e-5);
        assert!(k[[2, 2, 1]].abs() < 1e-5);
        assert!(k[[2, 2, 3]].abs() < 1e-5);
    }

    #[test]
    fn identity_correction_round_trips_the_samples() {
        let grid = Grid::new(4, 4, 3, 1).unwrap();
        let data = sample_data(&grid);
        let mut vol = SiVolume::new(grid, data.clone());
        let spec = ShiftSpec {
            apply_shift: false,
            ..ShiftSpec::default()
        };
        let out = vol.shift_corrected(&spec).unwrap();
        assert_eq!(out.shape(), data.shape());
        for (a, b) in out.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-3, "{} vs {}", a, b);
        }
    }

    #[test]
    fn correction_is_deterministic_and_leaves_kspace_alone() {
        let grid = Grid::new(4, 4, 2, 1).unwrap();
        let mut vol = SiVolume::new(grid, sample_data(&grid));
        let spec = ShiftSpec::default();
        let before = vol.kspace().clone();
        let first = vol.shift_corrected(&spec).unwrap();
        let second = vol.shift_corrected(&spec).unwrap();
        assert_eq!(first, second);
        assert_eq!(vol.kspace(), &before);
    }

    #[test]
    fn rotation_request_fails_the_correction() {
        let grid = Grid::new(4, 4, 2, 1).unwrap();
        let mut vol = SiVolume::new(grid, sample_data(&grid));
        let spec = ShiftSpec {
            rotation_angle: 0.2,
            ..ShiftSpec::default()
        };
        let err = vol.shift_corrected(&spec).unwrap_err();
        assert!(matches!(err, SiError::UnsupportedRotation { .. }));
    }
}
