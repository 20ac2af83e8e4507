use ndarray::{Array, Array2, Axis};
use num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

/// Forward 2D DFT, unnormalized.
pub fn fft2(slice: &Array2<Complex<f32>>) -> Array2<Complex<f32>> {
    transform(slice, FftDirection::Forward)
}

/// Inverse 2D DFT scaled by `1/(rows*cols)`.
///
/// The scale matches the reference reconstruction tool, so an ifft2 followed
/// by an fft2 is the identity with scale constant exactly 1. This pairing is
/// pinned by tests; do not switch either half to a unitary convention.
pub fn ifft2(slice: &Array2<Complex<f32>>) -> Array2<Complex<f32>> {
    let mut out = transform(slice, FftDirection::Inverse);
    let n = out.len() as f32;
    out.mapv_inplace(|e| e / n);
    out
}

/// Zero-frequency-to-center reordering along both axes (rotate each lane
/// right by half its length).
pub fn fftshift2(slice: &Array2<Complex<f32>>) -> Array2<Complex<f32>> {
    let mut slice = slice.clone();
    for axis in 0..2 {
        let n = slice.shape()[axis];
        for mut lane in slice.lanes_mut(Axis(axis)) {
            let mut temp = lane.to_vec();
            temp.rotate_right(n / 2);
            lane.assign(&Array::from_vec(temp));
        }
    }
    slice
}

/// Inverse of [`fftshift2`] (rotate each lane left by half its length).
/// Identical to `fftshift2` on even-length axes but kept separate so the
/// corrector exactly unwinds the builder's centering.
pub fn ifftshift2(slice: &Array2<Complex<f32>>) -> Array2<Complex<f32>> {
    let mut slice = slice.clone();
    for axis in 0..2 {
        let n = slice.shape()[axis];
        for mut lane in slice.lanes_mut(Axis(axis)) {
            let mut temp = lane.to_vec();
            temp.rotate_left(n / 2);
            lane.assign(&Array::from_vec(temp));
        }
    }
    slice
}

fn transform(slice: &Array2<Complex<f32>>, direction: FftDirection) -> Array2<Complex<f32>> {
    let mut slice = slice.clone();
    let mut shape = slice.shape().to_owned();
    shape.reverse();
    let mut fft_planner = FftPlanner::<f32>::new();
    for axis in 0..2 {
        let fft = fft_planner.plan_fft(shape[axis], direction);
        for mut line in slice.axis_iter_mut(Axis(axis)) {
            let mut temp = line.to_vec();
            fft.process(&mut temp);
            line.assign(&Array::from_vec(temp));
        }
    }
    slice
}
