//! Level calibration of convolved sources.
//!
//! A dry source is convolved with the reference channel of an impulse response, the
//! result is A-weighted and measured, and the gain that brings the measurement to the
//! target level is applied to every rendered microphone channel.

use ndarray::{Array1, Array2, ArrayView1, Axis};
#[cfg(feature = "parallel-processing")]
use rayon::prelude::*;

use super::profile::CorrectionGains;
use crate::operations::transforms::{FftConvolver, convolve_full};
use crate::utils::audio_math::db_to_amplitude;
use crate::{
    AudioSamples, AudioStatistics, AudioVoiceActivityDetection, AudioWeighting, CabinMixResult, LevelMode,
    ParameterError, SrhVadConfig,
};

/// Result of calibrating one source against a target level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// A-weighted level of the convolved reference channel, offset included.
    pub measured_db: f64,
    /// Offset that was added to the raw measurement.
    pub offset_db: f64,
    /// Requested level.
    pub target_db: f64,
    /// `target_db - measured_db`.
    pub correction_db: f64,
    /// Linear gain equivalent of `correction_db`.
    pub gain: f64,
}

/// Measures convolved sources and renders them at a calibrated level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelCalibrator {
    /// Whole-signal or voiced-only measurement.
    pub mode: LevelMode,
    /// Detector settings used in [`LevelMode::VoicedRms`].
    pub vad: SrhVadConfig,
}

impl LevelCalibrator {
    /// Calibrator using the given measurement mode and default detector settings.
    pub fn new(mode: LevelMode) -> Self {
        Self {
            mode,
            vad: SrhVadConfig::default(),
        }
    }

    /// Calibrator measuring only the voiced regions of the convolved signal.
    pub fn voiced() -> Self {
        Self::new(LevelMode::VoicedRms)
    }

    /// Replaces the detector settings.
    pub fn with_vad(mut self, vad: SrhVadConfig) -> Self {
        self.vad = vad;
        self
    }

    /// Checks the detector settings.
    pub fn validate(&self) -> CabinMixResult<()> {
        self.vad.validate()
    }

    /// A-weighted level of `signal` in dB according to [`mode`](Self::mode).
    pub fn measure_level_db(&self, signal: &AudioSamples) -> CabinMixResult<f64> {
        let weighted = signal.a_weighted()?;
        let level = match self.mode {
            LevelMode::Rms => weighted.level_db()?,
            LevelMode::VoicedRms => weighted.voiced_level_db(&self.vad)?,
        };
        tracing::trace!(mode = ?self.mode, level_db = level, "measured level");
        Ok(level)
    }

    /// Gain that brings `source` convolved with `ir_reference` to `target_db`.
    ///
    /// `offset_db` is added to the measurement before the correction is computed.
    pub fn calibrate(
        &self,
        source: ArrayView1<'_, f64>,
        ir_reference: ArrayView1<'_, f64>,
        sample_rate: u32,
        target_db: f64,
        offset_db: f64,
    ) -> CabinMixResult<Calibration> {
        let convolved = AudioSamples::new_mono(convolve_full(source, ir_reference), sample_rate);
        let measured_db = self.measure_level_db(&convolved)? + offset_db;
        let correction_db = target_db - measured_db;
        let gain = db_to_amplitude(correction_db);
        tracing::debug!(measured_db, target_db, correction_db, gain, "calibrated source");
        Ok(Calibration {
            measured_db,
            offset_db,
            target_db,
            correction_db,
            gain,
        })
    }

    /// Convolves `source` with the listed channels of `ir`.
    ///
    /// Channel `ch` is scaled by `gain · correction_gains[ch]`, or by `gain` alone when
    /// no correction gains are given. Every output channel has
    /// `len(source) + len(ir) - 1` samples.
    pub fn render(
        &self,
        source: ArrayView1<'_, f64>,
        ir: &AudioSamples,
        channels: &[usize],
        gain: f64,
        correction_gains: Option<&CorrectionGains>,
    ) -> CabinMixResult<AudioSamples> {
        let gains = match correction_gains {
            Some(table) => table.gains_for(channels)?.into_iter().map(|g| g * gain).collect(),
            None => vec![gain; channels.len()],
        };
        let jobs = channels
            .iter()
            .zip(gains)
            .map(|(&ch, g)| {
                let kernel = ir.channel(ch).ok_or_else(|| {
                    ParameterError::InvalidChannelSelection(format!(
                        "channel {ch} requested, impulse response has {} channels",
                        ir.num_channels()
                    ))
                })?;
                Ok((kernel, g))
            })
            .collect::<CabinMixResult<Vec<(ArrayView1<'_, f64>, f64)>>>()?;

        let convolver = FftConvolver::new(source, ir.samples_per_channel());

        #[cfg(feature = "parallel-processing")]
        let jobs_iter = jobs.par_iter();
        #[cfg(not(feature = "parallel-processing"))]
        let jobs_iter = jobs.iter();

        let rendered: Vec<Array1<f64>> = jobs_iter
            .map(|(kernel, g)| -> CabinMixResult<Array1<f64>> { Ok(convolver.convolve(kernel.view())? * *g) })
            .collect::<CabinMixResult<_>>()?;

        let len = rendered.first().map_or(0, Array1::len);
        let mut out = Array2::zeros((rendered.len(), len));
        for (mut row, channel) in out.axis_iter_mut(Axis(0)).zip(&rendered) {
            row.assign(channel);
        }
        Ok(AudioSamples::new_multi_channel(out, ir.sample_rate()))
    }
}
