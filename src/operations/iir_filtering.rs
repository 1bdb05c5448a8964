//! IIR filtering and A-weighting design.
//!
//! The A-weighting curve is specified as an analog transfer function. It is
//! digitised per sample rate with the zero-pole bilinear transform and applied with a
//! direct-form filter, one channel at a time from a zero initial state.

use std::f64::consts::PI;

use ndarray::{Array2, Axis};
use num_complex::Complex;

use crate::operations::traits::AudioWeighting;
use crate::{AudioSamples, CabinMixResult, ParameterError};

/// First A-weighting corner frequency in Hz.
pub const A_WEIGHTING_F1: f64 = 20.599;
/// Second A-weighting corner frequency in Hz.
pub const A_WEIGHTING_F2: f64 = 107.653;
/// Third A-weighting corner frequency in Hz.
pub const A_WEIGHTING_F3: f64 = 737.862;
/// Fourth A-weighting corner frequency in Hz.
pub const A_WEIGHTING_F4: f64 = 12_194.217;
/// Gain in dB that normalises the curve to 0 dB at 1 kHz.
pub const A_WEIGHTING_1KHZ_DB: f64 = 1.9997;

/// IIR filter implementation with internal state.
///
/// This structure represents an IIR filter with its coefficients and
/// internal state for recursive filtering operations.
#[derive(Debug, Clone)]
pub struct IirFilter {
    /// Feed-forward coefficients (b coefficients)
    pub b_coeffs: Vec<f64>,
    /// Feed-back coefficients (a coefficients)
    pub a_coeffs: Vec<f64>,
    /// Input delay line (x[n-1], x[n-2], ...)
    pub x_delays: Vec<f64>,
    /// Output delay line (y[n-1], y[n-2], ...)
    pub y_delays: Vec<f64>,
}

impl IirFilter {
    /// Create a new IIR filter with the given coefficients.
    ///
    /// # Errors
    /// Either coefficient vector is empty or `a[0]` is zero.
    pub fn new(b_coeffs: Vec<f64>, a_coeffs: Vec<f64>) -> CabinMixResult<Self> {
        if b_coeffs.is_empty() {
            return Err(ParameterError::invalid_value("b_coeffs", "must not be empty").into());
        }
        match a_coeffs.first() {
            Some(a0) if *a0 != 0.0 => {}
            _ => {
                return Err(ParameterError::invalid_value("a_coeffs", "a[0] must be non-zero").into());
            }
        }
        let x_delays = vec![0.0; b_coeffs.len() - 1];
        let y_delays = vec![0.0; a_coeffs.len() - 1];

        Ok(Self {
            b_coeffs,
            a_coeffs,
            x_delays,
            y_delays,
        })
    }

    /// Process a single sample through the filter.
    ///
    /// Applies the difference equation:
    /// y[n] = (b[0]*x[n] + ... + b[M]*x[n-M] - a[1]*y[n-1] - ... - a[N]*y[n-N]) / a[0]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let feed_forward: f64 = self.b_coeffs[1..]
            .iter()
            .zip(&self.x_delays)
            .map(|(b, x)| b * x)
            .sum();
        let feedback: f64 = self.a_coeffs[1..]
            .iter()
            .zip(&self.y_delays)
            .map(|(a, y)| a * y)
            .sum();
        let output = (self.b_coeffs[0] * input + feed_forward - feedback) / self.a_coeffs[0];

        if !self.x_delays.is_empty() {
            self.x_delays.rotate_right(1);
            self.x_delays[0] = input;
        }
        if !self.y_delays.is_empty() {
            self.y_delays.rotate_right(1);
            self.y_delays[0] = output;
        }

        output
    }

    /// Process a slice of samples through the filter.
    pub fn process_samples(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    /// Reset the filter's internal state.
    pub fn reset(&mut self) {
        self.x_delays.fill(0.0);
        self.y_delays.fill(0.0);
    }

    /// Get the frequency response at specified frequencies.
    ///
    /// Returns (magnitude, phase) response vectors.
    pub fn frequency_response(&self, frequencies: &[f64], sample_rate: f64) -> (Vec<f64>, Vec<f64>) {
        let evaluate = |coeffs: &[f64], z_inv: Complex<f64>| {
            // Horner in z^-1, highest power last
            coeffs
                .iter()
                .rev()
                .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
        };

        frequencies
            .iter()
            .map(|&freq| {
                let omega = 2.0 * PI * freq / sample_rate;
                let z_inv = Complex::from_polar(1.0, -omega);
                let h = evaluate(&self.b_coeffs, z_inv) / evaluate(&self.a_coeffs, z_inv);
                (h.norm(), h.arg())
            })
            .unzip()
    }
}

/// Expands real roots into polynomial coefficients, highest power first.
fn poly(roots: &[f64]) -> Vec<f64> {
    let mut coeffs = vec![1.0];
    for &root in roots {
        let mut next = vec![0.0; coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

/// Digital A-weighting coefficients `(b, a)` for `sample_rate`.
///
/// The analog prototype has four zeros at DC and poles at `-2πf1` (twice), `-2πf4`
/// (twice), `-2πf3` and `-2πf2`. All poles are real, so the bilinear transform keeps
/// the coefficients real.
pub fn a_weighting_coefficients(sample_rate: u32) -> CabinMixResult<(Vec<f64>, Vec<f64>)> {
    if sample_rate == 0 {
        return Err(ParameterError::invalid_value("sample_rate", "must be positive").into());
    }
    let fs2 = 2.0 * f64::from(sample_rate);

    let analog_poles = [
        -2.0 * PI * A_WEIGHTING_F1,
        -2.0 * PI * A_WEIGHTING_F1,
        -2.0 * PI * A_WEIGHTING_F4,
        -2.0 * PI * A_WEIGHTING_F4,
        -2.0 * PI * A_WEIGHTING_F3,
        -2.0 * PI * A_WEIGHTING_F2,
    ];
    let analog_zero_count = 4;
    let analog_gain = (2.0 * PI * A_WEIGHTING_F4).powi(2) * 10f64.powf(A_WEIGHTING_1KHZ_DB / 20.0);

    // zeros at DC land on z = 1; the two surplus poles add zeros at z = -1
    let mut digital_zeros = vec![1.0; analog_zero_count];
    digital_zeros.extend(std::iter::repeat_n(-1.0, analog_poles.len() - analog_zero_count));
    let digital_poles: Vec<f64> = analog_poles.iter().map(|p| (fs2 + p) / (fs2 - p)).collect();

    let zero_factor = fs2.powi(analog_zero_count as i32);
    let pole_factor: f64 = analog_poles.iter().map(|p| fs2 - p).product();
    let digital_gain = analog_gain * zero_factor / pole_factor;

    let b = poly(&digital_zeros).into_iter().map(|c| c * digital_gain).collect();
    let a = poly(&digital_poles);
    Ok((b, a))
}

/// A fresh A-weighting filter for `sample_rate`.
pub fn a_weighting_filter(sample_rate: u32) -> CabinMixResult<IirFilter> {
    let (b, a) = a_weighting_coefficients(sample_rate)?;
    IirFilter::new(b, a)
}

impl AudioWeighting for AudioSamples {
    fn a_weighted(&self) -> CabinMixResult<Self> {
        let mut filter = a_weighting_filter(self.sample_rate())?;
        let mut out = Array2::zeros((self.num_channels(), self.samples_per_channel()));
        for (channel, mut row) in self.channels().zip(out.axis_iter_mut(Axis(0))) {
            filter.reset();
            for (x, y) in channel.iter().zip(row.iter_mut()) {
                *y = filter.process_sample(*x);
            }
        }
        Ok(Self::new_multi_channel(out, self.sample_rate()))
    }
}
