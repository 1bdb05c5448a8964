// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![allow(clippy::too_many_arguments)]
// Calibration entry points take many parameters
#![deny(missing_docs)] // Documentation is a must for release

//! # cabin_mix
//!
//! Level-calibrated synthesis of multichannel in-car audio mixtures.
//!
//! Dry speech and playback audio are convolved with impulse responses measured in real
//! vehicles, calibrated against per-condition reference levels, combined with
//! in-cabin noise and ventilation recordings and aligned to a common length. A
//! pitch-strength (SRH) voice-activity detector measures the level of only the voiced
//! parts of a signal when plain RMS is not speech-accurate enough.
//!
//! ## Layout
//!
//! - [`AudioSamples`]: owned multichannel signal with its sample rate.
//! - [`operations`]: signal-level building blocks, grouped into focused traits
//!   ([`AudioStatistics`], [`AudioWeighting`], [`AudioVoiceActivityDetection`],
//!   [`AudioEditing`], [`AudioChannelOps`]) plus free functions such as
//!   [`match_duration`].
//! - [`cabin`]: vehicle configuration, the asset catalog seam, the level calibrator,
//!   the mixture synthesizer and the microphone-array geometry.
//! - [`utils`]: dB math and test-signal generators.
//!
//! ## Features
//!
//! - `resampling` (default): sample-rate conversion via `rubato`, used when assets are
//!   inserted into an [`InMemoryCatalog`] at a different rate.
//! - `parallel-processing`: renders per-microphone convolutions with `rayon`.
//!
//! ## Example
//!
//! ```rust
//! use cabin_mix::{AudioSamples, AudioStatistics, AudioWeighting};
//! use cabin_mix::utils::sine_wave;
//! use std::time::Duration;
//!
//! let tone = sine_wave(1000.0, Duration::from_secs(1), 16000, 0.5);
//! let weighted = tone.a_weighted().unwrap();
//! // A-weighting is normalised to 0 dB at 1 kHz.
//! let delta = weighted.level_db().unwrap() - tone.level_db().unwrap();
//! assert!(delta.abs() < 0.2);
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and spans and never installs a subscriber.

mod error;
mod repr;

pub mod cabin;
pub mod operations;
#[cfg(feature = "resampling")]
pub mod resampling;
pub mod utils;

pub use crate::error::{
    CabinMixError, CabinMixResult, CatalogError, ConfigError, LayoutError, ParameterError,
    ProcessingError,
};
pub use crate::repr::AudioSamples;

pub use crate::operations::{
    AudioChannelOps, AudioEditing, AudioStatistics, AudioVoiceActivityDetection, AudioWeighting,
    LevelMode, SrhVadConfig, VoicingTrack, Utterance, WindowType, match_duration,
};

pub use crate::cabin::{
    AssetCatalog, AssetType, Calibration, CarProfile, ChannelSelection, ConditionKey,
    CorrectionGains, DrivingCondition, InMemoryCatalog, LevelCalibrator, MixtureComponents,
    MixtureRequest, MixtureSynthesizer, PlaybackOffsets, WindowState, steering_vector,
};

#[cfg(feature = "resampling")]
pub use crate::resampling::resample;
