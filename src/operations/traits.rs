//! Core trait definitions for signal operations.
//!
//! Each trait covers a single concern and is implemented for [`AudioSamples`](crate::AudioSamples) in the
//! module of the same name.

use super::types::*;
use crate::CabinMixResult;

/// Level measurement.
///
/// RMS is taken over every sample of every channel; the calibrator always measures a
/// single selected channel, where the flattened and per-channel conventions agree.
pub trait AudioStatistics {
    /// Sum of squared samples over all channels.
    fn energy(&self) -> f64;

    /// `sqrt(mean(x²))` over all samples. An empty signal has RMS 0.
    fn rms(&self) -> f64;

    /// RMS of one channel.
    fn channel_rms(&self, channel: usize) -> CabinMixResult<f64>;

    /// `20·log10(rms)`.
    ///
    /// # Errors
    /// [`ProcessingError::ZeroEnergy`](crate::ProcessingError::ZeroEnergy) when the RMS
    /// is zero, so silent signals never yield `-inf` gains.
    fn level_db(&self) -> CabinMixResult<f64>;

    /// `20·log10(rms)` of one channel.
    fn channel_level_db(&self, channel: usize) -> CabinMixResult<f64>;
}

/// Perceptual frequency weighting.
pub trait AudioWeighting {
    /// Applies the A-weighting curve designed for the signal's own sample rate.
    ///
    /// Every channel is filtered independently from a zero initial state and keeps
    /// its length.
    fn a_weighted(&self) -> CabinMixResult<Self>
    where
        Self: Sized;
}

/// Pitch-strength voice-activity detection on mono signals.
///
/// The detector scores every analysis frame with the Summation of Residual Harmonics
/// (SRH) of the LPC residual and keeps runs of strongly pitched frames as utterances.
pub trait AudioVoiceActivityDetection {
    /// Voicing strength, pitch and center of every analysis frame.
    fn voicing_strength(&self, config: &SrhVadConfig) -> CabinMixResult<VoicingTrack>;

    /// Voiced regions after run filtering, padding and merging.
    ///
    /// An empty result is valid; it means nothing was voiced.
    fn voiced_segments(&self, config: &SrhVadConfig) -> CabinMixResult<Vec<Utterance>>;

    /// Level in dB of the voiced regions only.
    ///
    /// # Errors
    /// [`ProcessingError::NoVoicedActivity`](crate::ProcessingError::NoVoicedActivity)
    /// when no region survives segmentation.
    fn voiced_level_db(&self, config: &SrhVadConfig) -> CabinMixResult<f64>;
}

/// Time-domain editing used by the duration matcher.
pub trait AudioEditing {
    /// Extends the signal to `target_len` samples by equal-power crossfade looping.
    /// Signals already at least `target_len` long are truncated instead.
    fn loop_to_length(&self, target_len: usize) -> CabinMixResult<Self>
    where
        Self: Sized;

    /// Copy with exactly `target_len` samples per channel: truncated when longer,
    /// looped when shorter.
    fn fit_to_length(&self, target_len: usize) -> CabinMixResult<Self>
    where
        Self: Sized;
}

/// Channel-level operations.
pub trait AudioChannelOps {
    /// Copy holding only the listed channels, in the listed order.
    fn select_channels(&self, channels: &[usize]) -> CabinMixResult<Self>
    where
        Self: Sized;

    /// Average of all channels as a mono signal.
    fn to_mono(&self) -> CabinMixResult<Self>
    where
        Self: Sized;
}
