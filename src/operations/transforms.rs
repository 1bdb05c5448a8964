//! Window functions, magnitude spectra and linear convolution.

use std::f64::consts::PI;
use std::sync::Arc;

use ndarray::{Array1, ArrayView1};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::types::WindowType;
use crate::{CabinMixResult, ParameterError};

/// Kernels at most this long are convolved directly.
const DIRECT_CONVOLUTION_LIMIT: usize = 64;

/// Generates a symmetric window of `size` samples.
///
/// A single-sample window is `[1.0]` for every type.
pub fn generate_window(size: usize, window_type: WindowType) -> Vec<f64> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let n_max = (size - 1) as f64;
    match window_type {
        WindowType::Rectangular => vec![1.0; size],
        WindowType::Hanning => (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / n_max).cos()))
            .collect(),
        WindowType::Blackman => (0..size)
            .map(|i| {
                let n = i as f64;
                0.42 - 0.5 * (2.0 * PI * n / n_max).cos() + 0.08 * (4.0 * PI * n / n_max).cos()
            })
            .collect(),
    }
}

/// Reusable magnitude-spectrum computation at a fixed transform length.
///
/// Frames shorter than the transform are zero-padded; longer frames are truncated.
pub struct MagnitudeSpectrum {
    fft: Arc<dyn Fft<f64>>,
    buffer: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl MagnitudeSpectrum {
    /// Plans a forward transform of `n_fft` points.
    pub fn new(n_fft: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); n_fft],
            scratch,
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True for a zero-length transform.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Magnitudes of the first `keep` bins of the transform of `frame`.
    pub fn compute(&mut self, frame: &[f64], keep: usize) -> Vec<f64> {
        let n = self.buffer.len();
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = Complex::new(frame.get(i).copied().unwrap_or(0.0), 0.0);
        }
        if n > 0 {
            self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        }
        self.buffer.iter().take(keep).map(|c| c.norm()).collect()
    }
}

/// Scales `values` to unit Euclidean norm in place. All-zero vectors are left as is.
pub fn l2_normalize(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        values.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Full linear convolution: the output has `len(x) + len(h) - 1` samples.
///
/// Short kernels are convolved directly, longer ones through the FFT. An empty input
/// gives an empty output.
pub fn convolve_full(x: ArrayView1<'_, f64>, h: ArrayView1<'_, f64>) -> Array1<f64> {
    if x.is_empty() || h.is_empty() {
        return Array1::zeros(0);
    }
    if x.len().min(h.len()) <= DIRECT_CONVOLUTION_LIMIT {
        return convolve_direct(x, h);
    }
    FftConvolver::new(x, h.len()).convolve_unchecked(h)
}

fn convolve_direct(x: ArrayView1<'_, f64>, h: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut out = Array1::zeros(x.len() + h.len() - 1);
    for (i, &xi) in x.iter().enumerate() {
        if xi == 0.0 {
            continue;
        }
        for (j, &hj) in h.iter().enumerate() {
            out[i + j] += xi * hj;
        }
    }
    out
}

/// FFT convolution of one signal against many kernels.
///
/// The spectrum of the signal is computed once; every kernel (one impulse response
/// channel, typically) reuses it. The convolver is `Send + Sync`, so kernels can be
/// processed from several threads.
pub struct FftConvolver {
    signal_spectrum: Vec<Complex<f64>>,
    signal_len: usize,
    max_kernel_len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FftConvolver {
    /// Prepares `signal` for kernels of up to `max_kernel_len` samples.
    pub fn new(signal: ArrayView1<'_, f64>, max_kernel_len: usize) -> Self {
        let max_kernel_len = max_kernel_len.max(1);
        let fft_len = (signal.len() + max_kernel_len - 1).max(1).next_power_of_two();
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let mut signal_spectrum: Vec<Complex<f64>> =
            signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        signal_spectrum.resize(fft_len, Complex::new(0.0, 0.0));
        forward.process(&mut signal_spectrum);

        Self {
            signal_spectrum,
            signal_len: signal.len(),
            max_kernel_len,
            forward,
            inverse,
        }
    }

    /// Convolves the prepared signal with `kernel`.
    ///
    /// # Errors
    /// The kernel is longer than the length the convolver was prepared for.
    pub fn convolve(&self, kernel: ArrayView1<'_, f64>) -> CabinMixResult<Array1<f64>> {
        if kernel.len() > self.max_kernel_len {
            return Err(ParameterError::out_of_range("kernel length", kernel.len(), 0, self.max_kernel_len).into());
        }
        if self.signal_len == 0 || kernel.is_empty() {
            return Ok(Array1::zeros(0));
        }
        Ok(self.convolve_unchecked(kernel))
    }

    fn convolve_unchecked(&self, kernel: ArrayView1<'_, f64>) -> Array1<f64> {
        let fft_len = self.signal_spectrum.len();
        let mut buffer: Vec<Complex<f64>> = kernel.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(fft_len, Complex::new(0.0, 0.0));
        self.forward.process(&mut buffer);

        for (b, s) in buffer.iter_mut().zip(&self.signal_spectrum) {
            *b *= s;
        }
        self.inverse.process(&mut buffer);

        let scale = 1.0 / fft_len as f64;
        let out_len = self.signal_len + kernel.len() - 1;
        buffer.iter().take(out_len).map(|c| c.re * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn symmetric_windows() {
        let hann = generate_window(5, WindowType::Hanning);
        assert_eq!(hann.len(), 5);
        assert!(hann[0].abs() < 1e-12);
        assert_approx_eq!(hann[2], 1.0, 1e-12);
        assert_approx_eq!(hann[1], hann[3], 1e-12);

        let blackman = generate_window(5, WindowType::Blackman);
        assert!(blackman[0].abs() < 1e-12);
        assert_approx_eq!(blackman[2], 1.0, 1e-12);
        assert_eq!(generate_window(1, WindowType::Blackman), vec![1.0]);
    }

    #[test]
    fn direct_convolution_matches_definition() {
        let out = convolve_full(array![1.0, 2.0, 3.0].view(), array![0.0, 1.0, 0.5].view());
        assert_eq!(out, array![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn fft_convolution_agrees_with_direct() {
        let x = Array1::from_shape_fn(300, |i| ((i * 7) % 13) as f64 - 6.0);
        let h = Array1::from_shape_fn(100, |i| (-(i as f64) / 20.0).exp());
        let fast = convolve_full(x.view(), h.view());
        let slow = convolve_direct(x.view(), h.view());
        assert_eq!(fast.len(), 399);
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn convolver_rejects_long_kernels() {
        let conv = FftConvolver::new(array![1.0, 2.0].view(), 2);
        assert!(conv.convolve(array![1.0, 1.0, 1.0].view()).is_err());
        let out = conv.convolve(array![1.0, 1.0].view()).unwrap();
        assert_eq!(out.len(), 3);
        assert_approx_eq!(out[1], 3.0, 1e-12);
    }

    #[test]
    fn spectrum_of_dc_frame() {
        let mut spectrum = MagnitudeSpectrum::new(8);
        let mags = spectrum.compute(&[1.0; 4], 4);
        assert_approx_eq!(mags[0], 4.0, 1e-12);
        let mut normed = mags.clone();
        l2_normalize(&mut normed);
        assert_approx_eq!(normed.iter().map(|v| v * v).sum::<f64>(), 1.0, 1e-12);

        let mut zeros = vec![0.0; 3];
        l2_normalize(&mut zeros);
        assert_eq!(zeros, vec![0.0; 3]);
    }
}
