//! Level and time conversion helpers.
//!
//! Small numeric functions shared by the calibrator, the voice-activity detector and
//! the duration matcher.
//!
//! # Examples
//!
//! ```rust
//! use cabin_mix::utils::audio_math::{amplitude_to_db, db_to_amplitude};
//!
//! let db = amplitude_to_db(0.5_f64).unwrap(); // -6.02 dB
//! let amp = db_to_amplitude(db);
//! assert!((amp - 0.5).abs() < 1e-12);
//! ```

use num_traits::Float;

// =============================================================================
// AMPLITUDE CONVERSIONS
// =============================================================================

/// Converts a linear amplitude (an RMS value, typically) to decibels.
///
/// Uses `dB = 20 * log10(amplitude)`. Non-positive amplitudes have no level in dB
/// and return `None`; callers turn that into a zero-energy error.
pub fn amplitude_to_db<F: Float>(amplitude: F) -> Option<F> {
    if amplitude > F::zero() && amplitude.is_finite() {
        F::from(20.0).map(|twenty| twenty * amplitude.log10())
    } else {
        None
    }
}

/// Converts decibels to a linear amplitude factor: `10^(dB / 20)`.
pub fn db_to_amplitude<F: Float>(db: F) -> F {
    let ten = F::from(10.0).unwrap_or_else(F::one);
    let twenty = F::from(20.0).unwrap_or_else(F::one);
    ten.powf(db / twenty)
}

/// Linear gain that moves a signal measured at `measured_db` to `target_db`.
pub fn gain_from_db(target_db: f64, measured_db: f64) -> f64 {
    db_to_amplitude(target_db - measured_db)
}

// =============================================================================
// TIME CONVERSIONS
// =============================================================================

/// Rounds half-way cases to the nearest even integer, the convention numerical array
/// libraries use when converting durations to sample counts.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Number of samples covering `milliseconds` at `sample_rate`, rounded half to even.
pub fn ms_to_samples(milliseconds: f64, sample_rate: u32) -> usize {
    let samples = round_half_even(milliseconds * f64::from(sample_rate) / 1000.0);
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Number of samples covering `seconds` at `sample_rate`, truncated toward zero.
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    let samples = seconds * f64::from(sample_rate);
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Converts a sample index to seconds.
pub fn samples_to_seconds(samples: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    samples as f64 / f64::from(sample_rate)
}
