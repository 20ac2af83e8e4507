//! Disk-order to array-order conversion.
//!
//! The legacy formats serialize pixel-slowest / channel-fastest: a slice reads
//! as an `(n_pixels, n_channels)` block whose transpose is the logical
//! `(n_channels, n_pixels)` matrix, and a flattened spatial image enumerates
//! pixels as `p = row * cols + col`. Every loader and writer in the workspace
//! goes through these functions so the convention lives in exactly one place.

use ndarray::Array2;

/// column index of spatial pixel `(r, c)` in the flattened disk layout
pub fn pixel_index(r: usize, c: usize, cols: usize) -> usize {
    r * cols + c
}

/// Reshape a raw f32 stream of `n_pixels * n_channels` samples, as read from
/// disk, into the logical `(n_channels, n_pixels)` matrix.
pub fn disk_to_matrix(samples: Vec<f32>, n_pixels: usize, n_channels: usize) -> Array2<f32> {
    Array2::from_shape_vec((n_pixels, n_channels), samples)
        .expect("sample count does not match the grid")
        .reversed_axes()
        .as_standard_layout()
        .to_owned()
}

/// pixel-linear vector into a `(rows, cols)` spatial image
pub fn pixel_linear_to_grid<T>(pixels: Vec<T>, rows: usize, cols: usize) -> Array2<T> {
    Array2::from_shape_vec((rows, cols), pixels).expect("pixel count does not match the grid")
}

/// spatial image back to the pixel-linear vector
pub fn grid_to_pixel_linear<T: Clone>(image: &Array2<T>) -> Vec<T> {
    image.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_transpose() {
        // 2 pixels x 3 channels on disk: pixel 0 = [0,1,2], pixel 1 = [3,4,5]
        let m = disk_to_matrix(vec![0., 1., 2., 3., 4., 5.], 2, 3);
        assert_eq!(m.shape(), &[3, 2]);
        assert_eq!(m[[0, 0]], 0.);
        assert_eq!(m[[1, 0]], 1.);
        assert_eq!(m[[0, 1]], 3.);
        assert_eq!(m[[2, 1]], 5.);
    }

    #[test]
    fn pixel_linear_round_trip() {
        let v: Vec<f32> = (0..12).map(|x| x as f32).collect();
        let img = pixel_linear_to_grid(v.clone(), 3, 4);
        assert_eq!(img[[1, 2]], v[pixel_index(1, 2, 4)]);
        assert_eq!(grid_to_pixel_linear(&img), v);
    }
}
