//! Error types and result utilities for mixture synthesis and signal analysis.
//!
//! Errors are split into families so callers can tell a bad request apart from a
//! signal that cannot be measured:
//!
//! - [`ParameterError`], [`CatalogError`] and [`ConfigError`] are precondition
//!   failures: the request or configuration is wrong and nothing was computed.
//! - [`ProcessingError`] and [`LayoutError`] are degenerate-signal failures: the
//!   inputs were well formed but the signal cannot produce a meaningful result
//!   (zero energy, no voiced frames, mismatched channel counts).
//!
//! None of these are transient; every failure is a deterministic function of the
//! inputs.

use thiserror::Error;

/// Convenience type alias for results that may contain a [`CabinMixError`].
pub type CabinMixResult<T> = Result<T, CabinMixError>;

/// Top-level error type of the crate.
#[derive(Error, Debug)]
pub enum CabinMixError {
    /// Invalid argument supplied by the caller.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Signal shape problems (channel counts, sample rates, empty data).
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A computation could not produce a defined value for the given signal.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// The asset catalog does not hold the requested asset.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Vehicle configuration is missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CabinMixError {
    /// True for failures caused by the request or configuration itself.
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Parameter(_) | Self::Catalog(_) | Self::Config(_)
        )
    }

    /// True for failures caused by the content or shape of a signal.
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Processing(_) | Self::Layout(_))
    }
}

/// Invalid caller-supplied parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Generic invalid value.
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Parameter name.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Numeric value outside its accepted range.
    #[error("Parameter '{parameter}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Parameter name.
        parameter: String,
        /// Offending value.
        value: String,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },

    /// A sound level (speech effort, playback level) below zero or not finite.
    #[error("{parameter} must be a finite non-negative level, got {value} dB")]
    NegativeLevel {
        /// Which level was negative.
        parameter: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Window-state code outside 0..=3.
    #[error("Window state must be 0, 1, 2 or 3, got {0}")]
    InvalidWindowState(u8),

    /// Condition name that does not follow the `<name>_w<state>` pattern.
    #[error("Malformed condition '{0}', expected '<name>_w<0-3>'")]
    MalformedCondition(String),

    /// Channel selector that is empty or points outside the available channels.
    #[error("Invalid microphone selection: {0}")]
    InvalidChannelSelection(String),

    /// A level was requested for a component whose source signal is missing.
    #[error("A {component} level was given but no {component} signal was provided")]
    MissingSource {
        /// Component name (speech, playback).
        component: &'static str,
    },
}

impl ParameterError {
    /// Create an invalid value error.
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an out of range error.
    pub fn out_of_range(
        parameter: impl Into<String>,
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            parameter: parameter.into(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }
}

/// Shape and layout problems of signals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Signals in a batch disagree on channel count.
    #[error("Signal {index} has {actual} channels, expected {expected}")]
    ChannelMismatch {
        /// Position of the offending signal in the batch.
        index: usize,
        /// Channel count of the reference signal.
        expected: usize,
        /// Channel count found.
        actual: usize,
    },

    /// Signals in a batch disagree on sample rate.
    #[error("Signal {index} is sampled at {actual} Hz, expected {expected} Hz")]
    SampleRateMismatch {
        /// Position of the offending signal.
        index: usize,
        /// Expected rate.
        expected: u32,
        /// Rate found.
        actual: u32,
    },

    /// Operation requires a single-channel signal.
    #[error("{operation} requires a mono signal, got {channels} channels")]
    NotMono {
        /// Operation name.
        operation: &'static str,
        /// Channel count found.
        channels: usize,
    },

    /// Operation received a signal without samples.
    #[error("{operation} received an empty signal")]
    EmptyData {
        /// Operation name.
        operation: &'static str,
    },
}

/// A computation that has no defined result for the given signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    /// The measured signal has zero RMS, so its level in dB is undefined.
    #[error("{operation}: signal has zero energy, level is undefined")]
    ZeroEnergy {
        /// Operation name.
        operation: &'static str,
    },

    /// The voice-activity detector found no voiced utterance.
    #[error("No voiced activity detected in {frames} analysis frames")]
    NoVoicedActivity {
        /// Number of analysis frames that were examined.
        frames: usize,
    },

    /// An algorithm failed internally.
    #[error("{operation} failed: {reason}")]
    AlgorithmFailure {
        /// Operation name.
        operation: &'static str,
        /// Failure details.
        reason: String,
    },
}

impl ProcessingError {
    /// Create an algorithm failure error.
    pub fn algorithm_failure(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::AlgorithmFailure {
            operation,
            reason: reason.into(),
        }
    }
}

/// Missing assets in the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Microphone setup unknown to the catalog.
    #[error("Microphone setup '{0}' is not available")]
    UnknownMicSetup(String),

    /// Speaker position without any impulse response.
    #[error("Speaker location '{location}' is not available for '{mic_setup}'")]
    UnknownLocation {
        /// Microphone setup.
        mic_setup: String,
        /// Requested position.
        location: String,
    },

    /// Condition name not present for the asset type.
    #[error("{asset} condition '{condition}' is not available for '{mic_setup}'")]
    UnknownCondition {
        /// Microphone setup.
        mic_setup: String,
        /// Asset type display name.
        asset: String,
        /// Requested condition name.
        condition: String,
    },

    /// Asset type not recorded at all for this vehicle and setup.
    #[error("{asset} assets are not available for '{mic_setup}'")]
    AssetUnavailable {
        /// Microphone setup.
        mic_setup: String,
        /// Asset type display name.
        asset: String,
    },

    /// No reference level stored for the condition.
    #[error("No reference level for condition '{condition}' on '{mic_setup}'")]
    MissingReferenceLevel {
        /// Microphone setup.
        mic_setup: String,
        /// Condition name.
        condition: String,
    },

    /// A stored signal is at a different rate and cannot be converted.
    #[error("Asset sampled at {actual} Hz, catalog processes at {expected} Hz")]
    SampleRate {
        /// Processing rate of the catalog.
        expected: u32,
        /// Rate of the inserted signal.
        actual: u32,
    },
}

/// Vehicle configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The microphone setup has no reference channel configured.
    #[error("No reference microphone configured for '{0}'")]
    NoReferenceMic(String),

    /// No correction gain stored for a channel.
    #[error("No correction gain configured for channel {0}")]
    MissingCorrectionGain(usize),

    /// No playback offset stored for a channel.
    #[error("No playback level offset configured for channel {0}")]
    MissingPlaybackOffset(usize),

    /// No azimuth stored for a speaker position.
    #[error("No azimuth configured for speaker position '{0}'")]
    MissingSpeakerAngle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_are_disjoint() {
        let precondition: CabinMixError = ParameterError::InvalidWindowState(7).into();
        assert!(precondition.is_precondition());
        assert!(!precondition.is_degenerate());

        let degenerate: CabinMixError = ProcessingError::NoVoicedActivity { frames: 3 }.into();
        assert!(degenerate.is_degenerate());
        assert!(!degenerate.is_precondition());

        let layout: CabinMixError = LayoutError::ChannelMismatch {
            index: 1,
            expected: 2,
            actual: 1,
        }
        .into();
        assert!(layout.is_degenerate());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = CatalogError::UnknownMicSetup("roof".to_string());
        assert!(err.to_string().contains("roof"));

        let err = ParameterError::MissingSource { component: "speech" };
        assert!(err.to_string().contains("speech"));
    }
}
