//! Signal operations.
//!
//! Operations are grouped into focused traits implemented for
//! [`AudioSamples`](crate::AudioSamples):
//!
//! - [`AudioStatistics`]: energy, RMS and dB levels
//! - [`AudioWeighting`]: A-weighting
//! - [`AudioVoiceActivityDetection`]: SRH voicing strength, utterances, voiced level
//! - [`AudioEditing`]: truncation and crossfade looping
//! - [`AudioChannelOps`]: channel selection and mono mixdown
//!
//! Lower-level building blocks (IIR filters, windows, convolution, LPC) live in their
//! own modules and are usable on plain slices and array views.

pub mod traits;
pub mod types;

pub mod channels;
pub mod editing;
pub mod iir_filtering;
pub mod lpc;
pub mod statistics;
pub mod transforms;
pub mod vad;

pub use editing::match_duration;
pub use iir_filtering::{IirFilter, a_weighting_coefficients, a_weighting_filter};
pub use traits::{
    AudioChannelOps, AudioEditing, AudioStatistics, AudioVoiceActivityDetection, AudioWeighting,
};
pub use transforms::{FftConvolver, convolve_full, generate_window};
pub use types::{LevelMode, SrhVadConfig, Utterance, VoicingTrack, WindowType};
