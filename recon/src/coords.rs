use log::warn;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Scout-to-spectroscopy placement offsets. Anything non-zero is accepted but
/// has never been validated against a real acquisition, so it only warns.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct OffsetSpec {
    pub vertical_offset: f64,
    pub horizontal_offset: f64,
    /// radians
    pub rotation_angle: f64,
}

impl OffsetSpec {
    fn is_identity(&self) -> bool {
        self.vertical_offset == 0.0 && self.horizontal_offset == 0.0 && self.rotation_angle == 0.0
    }

    /// homogeneous 3x3 affine for the scout-to-grid transform
    fn affine(&self) -> DMatrix<f64> {
        let (sin, cos) = self.rotation_angle.sin_cos();
        DMatrix::from_row_slice(
            3,
            3,
            &[
                cos, sin, self.vertical_offset,
                -sin, cos, self.horizontal_offset,
                0.0, 0.0, 1.0,
            ],
        )
    }
}

/// Map user-picked scout pixel positions `(row, col)` into spectroscopy-grid
/// space.
///
/// Picked positions arrive in the cropped display orientation; the
/// acquisition frame counts from the opposite corner, hence the
/// `res + 2 - pos` flip before solving. The affine system is solved by least
/// squares so a future non-invertible placement still yields the best fit.
pub fn regen_coords(res: usize, offsets: &OffsetSpec, positions: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if !offsets.is_identity() {
        warn!("untested scout offsets/rotation in use: {:?}", offsets);
    }
    let n = positions.len();
    let mut homogenized = DMatrix::<f64>::from_element(3, n, 1.0);
    for (j, &(row, col)) in positions.iter().enumerate() {
        homogenized[(0, j)] = res as f64 + 2.0 - row;
        homogenized[(1, j)] = res as f64 + 2.0 - col;
    }
    let svd = offsets.affine().svd(true, true);
    let solved = svd
        .solve(&homogenized, f64::EPSILON)
        .expect("affine SVD was computed with U and V");
    (0..n).map(|j| (solved[(0, j)], solved[(1, j)])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_offsets_reduce_to_the_coordinate_flip() {
        let positions = [(130.0, 99.0), (121.0, 94.0)];
        let mapped = regen_coords(216, &OffsetSpec::default(), &positions);
        let expected = [(88.0, 119.0), (97.0, 124.0)];
        for ((r, c), (er, ec)) in mapped.iter().zip(expected.iter()) {
            assert!((r - er).abs() < 1e-9, "{} vs {}", r, er);
            assert!((c - ec).abs() < 1e-9, "{} vs {}", c, ec);
        }
    }

    #[test]
    fn pure_translation_subtracts_the_offset() {
        let offsets = OffsetSpec {
            vertical_offset: 3.0,
            horizontal_offset: -2.0,
            rotation_angle: 0.0,
        };
        let mapped = regen_coords(216, &offsets, &[(100.0, 100.0)]);
        // flip gives (118, 118); the affine moves (3, -2) so the solve undoes it
        assert!((mapped[0].0 - 115.0).abs() < 1e-9);
        assert!((mapped[0].1 - 120.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(regen_coords(216, &OffsetSpec::default(), &[]).is_empty());
    }
}
