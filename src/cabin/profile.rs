//! Per-vehicle configuration.
//!
//! Everything that differs between cars but is not a recorded signal lives here and
//! is loaded from JSON, so a new vehicle needs a configuration file rather than a
//! code change:
//!
//! ```json
//! {
//!   "make": "Smart",
//!   "model": "forfour",
//!   "year": 2019,
//!   "reference_mics": { "array": 4, "distributed": 0 },
//!   "speaker_angles": { "d50": -28, "fp60": 26, "prm": 0 },
//!   "correction_gains": { "0": 1.0, "1": 0.98 }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{CabinMixResult, ConfigError};

/// dB(FS,A) to dB(A) offsets of the radio calibration, per physical channel.
pub const DEFAULT_PLAYBACK_OFFSETS: [f64; 8] = [
    124.8755, 124.8381, 124.7017, 124.9197, 124.3212, 126.4183, 125.8413, 124.9133,
];

/// Static per-microphone sensitivity correction, as linear factors.
///
/// Serialised as a JSON object keyed by channel index (`{"0": 1.02, "1": 0.97}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrectionGains(BTreeMap<usize, f64>);

impl CorrectionGains {
    /// Unit gain for channels `0..channels`.
    pub fn unity(channels: usize) -> Self {
        Self((0..channels).map(|ch| (ch, 1.0)).collect())
    }

    /// Gain of one channel.
    pub fn gain(&self, channel: usize) -> CabinMixResult<f64> {
        self.0
            .get(&channel)
            .copied()
            .ok_or_else(|| ConfigError::MissingCorrectionGain(channel).into())
    }

    /// Gains of several channels, in order.
    pub fn gains_for(&self, channels: &[usize]) -> CabinMixResult<Vec<f64>> {
        channels.iter().map(|&ch| self.gain(ch)).collect()
    }

    /// Sets the gain of one channel.
    pub fn set(&mut self, channel: usize, gain: f64) {
        self.0.insert(channel, gain);
    }

    /// Number of configured channels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no channel is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, f64)> for CorrectionGains {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Offsets added to a playback measurement to turn full-scale dB into acoustic dB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaybackOffsets(BTreeMap<usize, f64>);

impl Default for PlaybackOffsets {
    fn default() -> Self {
        Self(DEFAULT_PLAYBACK_OFFSETS.iter().copied().enumerate().collect())
    }
}

impl PlaybackOffsets {
    /// Offset in dB for a reference channel.
    pub fn offset(&self, channel: usize) -> CabinMixResult<f64> {
        self.0
            .get(&channel)
            .copied()
            .ok_or_else(|| ConfigError::MissingPlaybackOffset(channel).into())
    }
}

/// Configuration of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarProfile {
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Model year.
    pub year: u16,
    /// Optional trim or version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Calibration reference channel per microphone setup. `null` marks a setup that
    /// cannot be calibrated.
    #[serde(default)]
    pub reference_mics: BTreeMap<String, Option<usize>>,
    /// Azimuth in degrees of each speaker position as seen from the array center;
    /// 0° points at the rear middle seat and the driver side is negative.
    #[serde(default)]
    pub speaker_angles: BTreeMap<String, f64>,
    /// Static microphone correction gains.
    #[serde(default)]
    pub correction_gains: CorrectionGains,
    /// Playback calibration offsets.
    #[serde(default)]
    pub playback_offsets: PlaybackOffsets,
}

impl CarProfile {
    /// A profile with no microphone setups configured.
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: u16) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
            version: None,
            reference_mics: BTreeMap::new(),
            speaker_angles: BTreeMap::new(),
            correction_gains: CorrectionGains::default(),
            playback_offsets: PlaybackOffsets::default(),
        }
    }

    /// Parses a profile from JSON.
    pub fn from_json(json: &str) -> CabinMixResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Serialises the profile to pretty JSON.
    pub fn to_json(&self) -> CabinMixResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Sets the reference channel of a microphone setup.
    pub fn with_reference_mic(mut self, mic_setup: impl Into<String>, channel: Option<usize>) -> Self {
        self.reference_mics.insert(mic_setup.into(), channel);
        self
    }

    /// Sets the azimuth of a speaker position.
    pub fn with_speaker_angle(mut self, position: impl Into<String>, degrees: f64) -> Self {
        self.speaker_angles.insert(position.into(), degrees);
        self
    }

    /// Replaces the correction gains.
    pub fn with_correction_gains(mut self, gains: CorrectionGains) -> Self {
        self.correction_gains = gains;
        self
    }

    /// `{make}_{model}`, the identifier used to name per-car data.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.make, self.model)
    }

    /// Reference channel used to calibrate `mic_setup`.
    ///
    /// # Errors
    /// [`ConfigError::NoReferenceMic`] when the setup is unknown or has no reference.
    pub fn reference_mic(&self, mic_setup: &str) -> CabinMixResult<usize> {
        self.reference_mics
            .get(mic_setup)
            .copied()
            .flatten()
            .ok_or_else(|| ConfigError::NoReferenceMic(mic_setup.to_string()).into())
    }

    /// Azimuth of a speaker position in degrees.
    pub fn speaker_angle(&self, position: &str) -> CabinMixResult<f64> {
        self.speaker_angles
            .get(position)
            .copied()
            .ok_or_else(|| ConfigError::MissingSpeakerAngle(position.to_string()).into())
    }
}

impl Display for CarProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.make, self.model, self.year)?;
        if let Some(version) = &self.version {
            write!(f, " {version}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CabinMixError;

    const GOLF: &str = r#"{
        "make": "Volkswagen",
        "model": "Golf",
        "year": 2017,
        "version": "VII",
        "reference_mics": { "array": 4, "distributed": 0 },
        "speaker_angles": { "d": -25, "fp": 25, "prm": 0, "prm10l": -4 },
        "correction_gains": { "0": 1.0, "4": 0.5 }
    }"#;

    #[test]
    fn profile_parses_from_json() {
        let profile = CarProfile::from_json(GOLF).unwrap();
        assert_eq!(profile.to_string(), "Volkswagen Golf 2017 VII");
        assert_eq!(profile.identifier(), "Volkswagen_Golf");
        assert_eq!(profile.reference_mic("array").ok(), Some(4));
        assert_eq!(profile.speaker_angle("d").ok(), Some(-25.0));
        assert_eq!(profile.correction_gains.gain(4).ok(), Some(0.5));
        assert_eq!(profile.playback_offsets.offset(5).ok(), Some(126.4183));
    }

    #[test]
    fn missing_entries_are_config_errors() {
        let profile = CarProfile::new("Alfa Romeo", "146", 1998).with_reference_mic("array", None);
        assert!(matches!(
            profile.reference_mic("array"),
            Err(CabinMixError::Config(ConfigError::NoReferenceMic(_)))
        ));
        assert!(profile.reference_mic("roof").is_err());
        assert!(matches!(
            profile.correction_gains.gain(0),
            Err(CabinMixError::Config(ConfigError::MissingCorrectionGain(0)))
        ));
        assert!(profile.speaker_angle("d").is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            CarProfile::from_json("{\"make\": 3}"),
            Err(CabinMixError::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn json_round_trip_keeps_gains() {
        let profile = CarProfile::new("Honda", "CR-V", 2016)
            .with_reference_mic("array", Some(4))
            .with_correction_gains(CorrectionGains::unity(8));
        let json = profile.to_json().unwrap();
        let back = CarProfile::from_json(&json).unwrap();
        assert_eq!(back, profile);
    }
}
