//! Supporting types and configuration structures for the signal operations.

use crate::{CabinMixResult, ParameterError};

/// Window functions for frame analysis.
///
/// All windows are symmetric (the first and last samples mirror each other), the
/// convention of numerical array libraries' `hanning`/`blackman`.
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum WindowType {
    /// Rectangular window (no windowing).
    Rectangular,
    /// Hann window, used for LPC analysis frames.
    Hanning,
    /// Blackman window, used for the SRH spectra: low leakage but wider main lobe.
    Blackman,
}

/// How the calibrator turns a weighted signal into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelMode {
    /// `20·log10(rms)` over the whole signal.
    #[default]
    Rms,
    /// `20·log10(rms)` over the voiced utterances found by the SRH detector only.
    VoicedRms,
}

/// Configuration of the pitch-strength (SRH) voice-activity detector.
///
/// Defaults reproduce the settings the detector was tuned with for in-car speech:
/// 180 ms frames every 60 ms, pitch search over 70–360 Hz with four harmonics.
#[derive(Debug, Clone, PartialEq)]
pub struct SrhVadConfig {
    /// Lowest candidate pitch in Hz (inclusive).
    pub f0_min: usize,
    /// Highest candidate pitch in Hz (exclusive).
    pub f0_max: usize,
    /// Number of harmonics summed per candidate.
    pub harmonics: usize,
    /// A frame is active when its voicing strength is strictly above this value.
    pub threshold: f64,
    /// Analysis frame duration in ms.
    pub frame_ms: f64,
    /// Analysis hop in ms.
    pub hop_ms: f64,
    /// LPC frame duration in ms.
    pub lpc_frame_ms: f64,
    /// LPC hop in ms.
    pub lpc_hop_ms: f64,
    /// LPC order per kHz of sample rate.
    pub lpc_order_per_khz: f64,
    /// Runs of active frames shorter than this are discarded.
    pub min_active_frames: usize,
    /// Utterances shorter than this are padded symmetrically toward it.
    pub min_utterance_frames: usize,
    /// Utterances separated by at most this many frames are merged.
    pub elastic_frames: usize,
}

impl Default for SrhVadConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SrhVadConfig {
    /// Default detector settings.
    pub const fn new() -> Self {
        Self {
            f0_min: 70,
            f0_max: 360,
            harmonics: 4,
            threshold: 0.05,
            frame_ms: 180.0,
            hop_ms: 60.0,
            lpc_frame_ms: 25.0,
            lpc_hop_ms: 5.0,
            lpc_order_per_khz: 0.75,
            min_active_frames: 2,
            min_utterance_frames: 12,
            elastic_frames: 5,
        }
    }

    /// Same settings with a different activity threshold.
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Checks that the configuration describes a usable detector.
    pub fn validate(&self) -> CabinMixResult<()> {
        if self.f0_min == 0 {
            return Err(ParameterError::invalid_value("f0_min", "must be at least 1 Hz").into());
        }
        if self.f0_max <= self.f0_min {
            return Err(ParameterError::invalid_value(
                "f0_max",
                format!("must exceed f0_min ({})", self.f0_min),
            )
            .into());
        }
        if self.harmonics == 0 {
            return Err(ParameterError::invalid_value("harmonics", "must be at least 1").into());
        }
        if !self.threshold.is_finite() {
            return Err(ParameterError::invalid_value("threshold", "must be finite").into());
        }
        for (name, value) in [
            ("frame_ms", self.frame_ms),
            ("hop_ms", self.hop_ms),
            ("lpc_frame_ms", self.lpc_frame_ms),
            ("lpc_hop_ms", self.lpc_hop_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParameterError::invalid_value(name, "must be a positive duration").into());
            }
        }
        if !(self.lpc_order_per_khz.is_finite() && self.lpc_order_per_khz > 0.0) {
            return Err(ParameterError::invalid_value("lpc_order_per_khz", "must be positive").into());
        }
        Ok(())
    }
}

/// Per-frame output of the SRH pitch-strength analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct VoicingTrack {
    /// Voicing strength of each analysis frame (maximum SRH score).
    pub strength: Vec<f64>,
    /// Pitch candidate in Hz that produced the maximum score.
    pub f0: Vec<f64>,
    /// Sample index of each frame center.
    pub centers: Vec<usize>,
    /// Sample rate of the analysed signal.
    pub sample_rate: u32,
}

impl VoicingTrack {
    /// Number of analysis frames.
    pub fn len(&self) -> usize {
        self.strength.len()
    }

    /// True when the signal was too short for a single analysis frame.
    pub fn is_empty(&self) -> bool {
        self.strength.is_empty()
    }

    /// Frame center times in seconds.
    pub fn times(&self) -> Vec<f64> {
        let fs = f64::from(self.sample_rate.max(1));
        self.centers.iter().map(|&c| c as f64 / fs).collect()
    }

    /// Indices of frames whose strength is strictly above `threshold`.
    pub fn active_frames(&self, threshold: f64) -> Vec<usize> {
        self.strength
            .iter()
            .enumerate()
            .filter(|(_, s)| **s > threshold)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A voiced region, as an inclusive frame range and the matching sample range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utterance {
    /// First frame of the region.
    pub start_frame: usize,
    /// Last frame of the region (inclusive).
    pub end_frame: usize,
    /// First sample (center of `start_frame`).
    pub start_sample: usize,
    /// One past the last sample (center of `end_frame`).
    pub end_sample: usize,
}

impl Utterance {
    /// Number of frames covered.
    pub const fn frame_count(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    /// Number of samples covered.
    pub const fn sample_count(&self) -> usize {
        self.end_sample.saturating_sub(self.start_sample)
    }
}
