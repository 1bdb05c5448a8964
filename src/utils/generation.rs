//! Deterministic test-signal generation.
//!
//! Used for calibration checks and documentation examples: pure tones, silence and
//! glottal-like pulse trains (the simplest signal with a clear pitch in its LPC
//! residual).

use std::f64::consts::PI;
use std::time::Duration;

use ndarray::Array1;

use crate::AudioSamples;
use crate::utils::audio_math::seconds_to_samples;

/// Generates a mono sine wave.
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `duration` - Signal duration
/// * `sample_rate` - Sample rate in Hz
/// * `amplitude` - Peak amplitude
pub fn sine_wave(frequency: f64, duration: Duration, sample_rate: u32, amplitude: f64) -> AudioSamples {
    let n = seconds_to_samples(duration.as_secs_f64(), sample_rate);
    let fs = f64::from(sample_rate.max(1));
    let data = Array1::from_shape_fn(n, |i| amplitude * (2.0 * PI * frequency * i as f64 / fs).sin());
    AudioSamples::new_mono(data, sample_rate)
}

/// Generates a silent mono signal.
pub fn silence(duration: Duration, sample_rate: u32) -> AudioSamples {
    let n = seconds_to_samples(duration.as_secs_f64(), sample_rate);
    AudioSamples::new_mono(Array1::zeros(n), sample_rate)
}

/// Generates a mono train of unit impulses at `frequency` Hz.
///
/// Impulses fall on `round(k * fs / frequency)`; a non-positive frequency yields
/// silence.
pub fn pulse_train(frequency: f64, duration: Duration, sample_rate: u32, amplitude: f64) -> AudioSamples {
    let n = seconds_to_samples(duration.as_secs_f64(), sample_rate);
    let mut data = Array1::zeros(n);
    if frequency > 0.0 {
        let period = f64::from(sample_rate) / frequency;
        let mut k = 0.0;
        loop {
            let idx = (k * period).round() as usize;
            if idx >= n {
                break;
            }
            data[idx] = amplitude;
            k += 1.0;
        }
    }
    AudioSamples::new_mono(data, sample_rate)
}

/// Concatenates mono signals sharing a sample rate. Returns `None` on mismatched
/// rates or multichannel input.
pub fn concatenate_mono(parts: &[AudioSamples]) -> Option<AudioSamples> {
    let sample_rate = parts.first()?.sample_rate();
    let mut out = Vec::new();
    for part in parts {
        if part.sample_rate() != sample_rate {
            return None;
        }
        out.extend(part.as_mono()?.iter().copied());
    }
    Some(AudioSamples::new_mono(Array1::from_vec(out), sample_rate))
}
