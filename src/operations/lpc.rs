//! Linear prediction: Burg fitting and LPC-residual extraction.
//!
//! The residual of a voiced signal is close to a pulse train at the glottal rate,
//! which is what the SRH detector looks for.

use ndarray::{Array1, ArrayView1, s};

use super::transforms::generate_window;
use super::types::WindowType;
use crate::{CabinMixResult, ParameterError};

/// Fits an all-pole model of `order` to `frame` with Burg's method.
///
/// Returns the prediction-error filter `A` with `A[0] = 1` and `order + 1` taps.
///
/// # Errors
/// The frame needs more than `order + 1` samples.
pub fn burg_lpc(frame: &[f64], order: usize) -> CabinMixResult<Vec<f64>> {
    if frame.len() <= order + 1 {
        return Err(ParameterError::invalid_value(
            "order",
            format!("LPC order {order} needs more than {} samples, got {}", order + 1, frame.len()),
        )
        .into());
    }

    let mut ar = vec![0.0; order + 1];
    ar[0] = 1.0;
    let mut ar_prev = ar.clone();

    let mut fwd: Vec<f64> = frame[1..].to_vec();
    let mut bwd: Vec<f64> = frame[..frame.len() - 1].to_vec();
    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    let mut den = dot(&fwd, &fwd) + dot(&bwd, &bwd);

    for i in 0..order {
        let reflect = -2.0 * dot(&bwd, &fwd) / (den + f64::MIN_POSITIVE);

        std::mem::swap(&mut ar, &mut ar_prev);
        for j in 1..=i + 1 {
            ar[j] = ar_prev[j] + reflect * ar_prev[i + 1 - j];
        }

        for (f, b) in fwd.iter_mut().zip(bwd.iter_mut()) {
            let f_old = *f;
            *f += reflect * *b;
            *b += reflect * f_old;
        }

        let q = 1.0 - reflect * reflect;
        let last_bwd = bwd.last().copied().unwrap_or(0.0);
        let first_fwd = fwd.first().copied().unwrap_or(0.0);
        den = q * den - last_bwd * last_bwd - first_fwd * first_fwd;

        fwd.remove(0);
        bwd.pop();
    }

    Ok(ar)
}

/// FIR filtering with zero initial state; the output has the input's length.
pub fn fir_filter(taps: &[f64], input: &[f64]) -> Vec<f64> {
    (0..input.len())
        .map(|n| {
            taps.iter()
                .take(n + 1)
                .enumerate()
                .map(|(k, a)| a * input[n - k])
                .sum()
        })
        .collect()
}

/// LPC residual of `signal` by overlap-add of energy-matched inverse-filtered frames.
///
/// Frames of `frame_len` samples every `hop` samples are Hann windowed, fitted with
/// Burg's method, inverse filtered and rescaled to the windowed frame's energy.
/// Frames are taken while they end strictly before the last sample, so the tail of the
/// signal can stay zero. Silent frames contribute nothing.
pub fn lpc_residual(
    signal: ArrayView1<'_, f64>,
    frame_len: usize,
    hop: usize,
    order: usize,
) -> CabinMixResult<Array1<f64>> {
    if frame_len == 0 {
        return Err(ParameterError::invalid_value("frame_len", "must be positive").into());
    }
    if hop == 0 {
        return Err(ParameterError::invalid_value("hop", "must be positive").into());
    }

    let n = signal.len();
    let window = generate_window(frame_len, WindowType::Hanning);
    let mut residual = Array1::zeros(n);

    let mut start = 0;
    while start + frame_len < n {
        let segment: Vec<f64> = signal
            .slice(s![start..start + frame_len])
            .iter()
            .zip(&window)
            .map(|(x, w)| x * w)
            .collect();

        let segment_energy: f64 = segment.iter().map(|x| x * x).sum();
        if segment_energy > 0.0 {
            let taps = burg_lpc(&segment, order)?;
            let inverse = fir_filter(&taps, &segment);
            let inverse_energy: f64 = inverse.iter().map(|x| x * x).sum();
            let gain = (segment_energy / inverse_energy).sqrt();
            if inverse_energy > 0.0 && gain.is_finite() {
                let mut target = residual.slice_mut(s![start..start + frame_len]);
                for (r, e) in target.iter_mut().zip(&inverse) {
                    *r += e * gain;
                }
            }
        }

        start += hop;
    }

    Ok(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn burg_recovers_first_order_process() {
        // x[n] = 0.9 x[n-1] + e[n] with a deterministic excitation
        let mut x = vec![0.0; 2000];
        let mut state = 12345_u64;
        for n in 1..x.len() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let e = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            x[n] = 0.9 * x[n - 1] + e;
        }
        let a = burg_lpc(&x, 1).unwrap();
        assert_eq!(a.len(), 2);
        assert_approx_eq!(a[0], 1.0, 1e-15);
        assert_approx_eq!(a[1], -0.9, 0.06);
    }

    #[test]
    fn burg_rejects_short_frames() {
        assert!(burg_lpc(&[1.0, 2.0], 1).is_err());
        assert_eq!(burg_lpc(&[1.0, 2.0], 0).unwrap(), vec![1.0]);
    }

    #[test]
    fn fir_filter_is_causal() {
        assert_eq!(fir_filter(&[1.0, -0.5], &[1.0, 1.0, 1.0]), vec![1.0, 0.5, 0.5]);
    }

    #[test]
    fn silent_input_gives_silent_residual() {
        let signal = Array1::zeros(1000);
        let res = lpc_residual(signal.view(), 100, 20, 8).unwrap();
        assert_eq!(res.len(), 1000);
        assert!(res.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn residual_frames_are_energy_matched() {
        let signal = Array1::from_shape_fn(201, |i| (i as f64 * 0.3).sin() + 0.2 * (i as f64 * 1.7).cos());
        // a single frame: start 0, stop 200 < 201
        let res = lpc_residual(signal.view(), 200, 500, 4).unwrap();
        let window = generate_window(200, WindowType::Hanning);
        let windowed: f64 = signal.iter().zip(&window).map(|(x, w)| (x * w).powi(2)).sum();
        let residual: f64 = res.iter().map(|x| x * x).sum();
        assert_approx_eq!(residual, windowed, 1e-9);
        assert_eq!(res[200], 0.0);
    }
}
