//! Pitch-strength voice-activity detection.
//!
//! Frames of the LPC residual are scored with the Summation of Residual Harmonics
//! (SRH): the normalised magnitude spectrum summed at the harmonics of a pitch
//! candidate minus the spectrum between them. A frame whose best candidate scores
//! above the threshold is active; runs of active frames become utterances, and the
//! level of the input over those utterances is the voiced level.

use ndarray::{ArrayView1, s};

use super::lpc::lpc_residual;
use super::traits::AudioVoiceActivityDetection;
use super::transforms::{MagnitudeSpectrum, generate_window, l2_normalize};
use super::types::{SrhVadConfig, Utterance, VoicingTrack, WindowType};
use crate::utils::audio_math::{amplitude_to_db, ms_to_samples, round_half_even};
use crate::{AudioSamples, CabinMixResult, LayoutError, ParameterError, ProcessingError};

/// Summation of Residual Harmonics of one normalised spectrum.
///
/// Returns `(best_f0, best_score)` over candidates `f0_min..f0_max`. Bin indices wrap
/// modulo the spectrum length.
pub fn srh_score(spectrum: &[f64], f0_min: usize, f0_max: usize, harmonics: usize) -> (usize, f64) {
    let n = spectrum.len();
    if n == 0 {
        return (f0_min, 0.0);
    }

    let mut best = (f0_min, f64::NEG_INFINITY);
    for f in f0_min..f0_max {
        let plus: f64 = (1..=harmonics).map(|k| spectrum[(k * f) % n]).sum();
        let minus: f64 = (1..harmonics)
            .map(|k| {
                let idx = round_half_even((k as f64 + 0.5) * f as f64) as usize;
                spectrum[idx % n]
            })
            .sum();
        let score = plus - minus;
        if score > best.1 {
            best = (f, score);
        }
    }
    best
}

/// Groups active frame indices into utterances, as inclusive frame ranges.
///
/// Runs shorter than `min_active_frames` are dropped. Runs shorter than
/// `min_utterance_frames` are padded by `ceil((min - len) / 2)` frames on both sides
/// when that stays within `[0, frame_count - 1]` and dropped otherwise. Neighbours
/// whose gap is at most `elastic_frames` are merged.
pub fn find_utterances(active: &[usize], frame_count: usize, config: &SrhVadConfig) -> Vec<(usize, usize)> {
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &idx in active {
        match runs.last_mut() {
            Some((_, end)) if idx == *end + 1 => *end = idx,
            _ => runs.push((idx, idx)),
        }
    }

    let last_frame = frame_count.saturating_sub(1);
    let padded = runs.into_iter().filter_map(|(start, end)| {
        let len = end - start + 1;
        if len < config.min_active_frames {
            return None;
        }
        if len >= config.min_utterance_frames {
            return Some((start, end));
        }
        let add = (config.min_utterance_frames - len).div_ceil(2);
        (start >= add && end + add <= last_frame).then(|| (start - add, end + add))
    });

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in padded {
        match merged.last_mut() {
            Some((_, prev_end)) if start <= *prev_end + config.elastic_frames => {
                *prev_end = (*prev_end).max(end);
            }
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Computes the SRH voicing track of a mono signal.
pub fn srh_voicing_track(
    signal: ArrayView1<'_, f64>,
    sample_rate: u32,
    config: &SrhVadConfig,
) -> CabinMixResult<VoicingTrack> {
    config.validate()?;
    let n_bins = (sample_rate / 2) as usize;
    if n_bins == 0 {
        return Err(ParameterError::invalid_value("sample_rate", "too low for spectral analysis").into());
    }

    let lpc_frame = ms_to_samples(config.lpc_frame_ms, sample_rate);
    let lpc_hop = ms_to_samples(config.lpc_hop_ms, sample_rate);
    let lpc_order = round_half_even(config.lpc_order_per_khz * f64::from(sample_rate) / 1000.0) as usize;
    let residual = lpc_residual(signal, lpc_frame, lpc_hop, lpc_order)?;

    let raw_len = ms_to_samples(config.frame_ms, sample_rate).saturating_sub(2);
    let frame_len = round_half_even(raw_len as f64 / 2.0) as usize * 2;
    let hop = ms_to_samples(config.hop_ms, sample_rate);
    if frame_len == 0 || hop == 0 {
        return Err(ParameterError::invalid_value(
            "frame_ms",
            format!("analysis frame or hop is empty at {sample_rate} Hz"),
        )
        .into());
    }
    let half = frame_len / 2;

    let n = signal.len();
    let centers: Vec<usize> = (half + 1..n.saturating_sub(half)).step_by(hop).collect();

    let window = generate_window(frame_len, WindowType::Blackman);
    let mut analyzer = MagnitudeSpectrum::new(sample_rate as usize);
    let mut strength = Vec::with_capacity(centers.len());
    let mut f0 = Vec::with_capacity(centers.len());

    for &center in &centers {
        let mut frame: Vec<f64> = residual
            .slice(s![center - half..center + half])
            .iter()
            .zip(&window)
            .map(|(x, w)| x * w)
            .collect();
        let mean = frame.iter().sum::<f64>() / frame_len as f64;
        frame.iter_mut().for_each(|x| *x -= mean);

        let mut spectrum = analyzer.compute(&frame, n_bins);
        l2_normalize(&mut spectrum);
        let (best_f0, best_score) = srh_score(&spectrum, config.f0_min, config.f0_max, config.harmonics);
        strength.push(best_score);
        f0.push(best_f0 as f64);
    }

    tracing::trace!(frames = centers.len(), frame_len, hop, lpc_order, "computed SRH voicing track");

    Ok(VoicingTrack {
        strength,
        f0,
        centers,
        sample_rate,
    })
}

fn utterances_from_track(track: &VoicingTrack, config: &SrhVadConfig) -> Vec<Utterance> {
    let active = track.active_frames(config.threshold);
    let utterances: Vec<Utterance> = find_utterances(&active, track.len(), config)
        .into_iter()
        .map(|(start_frame, end_frame)| Utterance {
            start_frame,
            end_frame,
            start_sample: track.centers[start_frame],
            end_sample: track.centers[end_frame],
        })
        .collect();

    tracing::debug!(
        frames = track.len(),
        active = active.len(),
        utterances = utterances.len(),
        "segmented voiced frames"
    );
    utterances
}

fn require_mono<'a>(audio: &'a AudioSamples, operation: &'static str) -> CabinMixResult<ArrayView1<'a, f64>> {
    audio.as_mono().ok_or_else(|| {
        LayoutError::NotMono {
            operation,
            channels: audio.num_channels(),
        }
        .into()
    })
}

impl AudioVoiceActivityDetection for AudioSamples {
    fn voicing_strength(&self, config: &SrhVadConfig) -> CabinMixResult<VoicingTrack> {
        let signal = require_mono(self, "voicing_strength")?;
        srh_voicing_track(signal, self.sample_rate(), config)
    }

    fn voiced_segments(&self, config: &SrhVadConfig) -> CabinMixResult<Vec<Utterance>> {
        let track = self.voicing_strength(config)?;
        Ok(utterances_from_track(&track, config))
    }

    fn voiced_level_db(&self, config: &SrhVadConfig) -> CabinMixResult<f64> {
        let signal = require_mono(self, "voiced_level_db")?;
        let track = srh_voicing_track(signal, self.sample_rate(), config)?;
        let utterances = utterances_from_track(&track, config);

        let (energy, count) = utterances.iter().fold((0.0, 0usize), |(energy, count), u| {
            let part = signal.slice(s![u.start_sample..u.end_sample]);
            (energy + part.iter().map(|x| x * x).sum::<f64>(), count + part.len())
        });
        if count == 0 {
            return Err(ProcessingError::NoVoicedActivity { frames: track.len() }.into());
        }

        let level = amplitude_to_db((energy / count as f64).sqrt())
            .ok_or(ProcessingError::ZeroEnergy { operation: "voiced_level_db" })?;
        tracing::debug!(level_db = level, voiced_samples = count, "measured voiced level");
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::utils::generation::{concatenate_mono, pulse_train, silence, sine_wave};
    use crate::{AudioStatistics, CabinMixError};
    use std::time::Duration;

    const FS: u32 = 16000;

    fn config() -> SrhVadConfig {
        SrhVadConfig::default()
    }

    fn embedded_in_silence(burst: AudioSamples) -> AudioSamples {
        concatenate_mono(&[
            silence(Duration::from_secs(1), FS),
            burst,
            silence(Duration::from_secs(1), FS),
        ])
        .unwrap()
    }

    fn voiced_burst() -> AudioSamples {
        embedded_in_silence(pulse_train(160.0, Duration::from_secs(1), FS, 0.5))
    }

    fn tone_burst(frequency: f64) -> AudioSamples {
        embedded_in_silence(sine_wave(frequency, Duration::from_secs(1), FS, 0.5))
    }

    #[test]
    fn srh_prefers_the_true_pitch() {
        let mut spectrum = vec![0.0; 8000];
        for k in 1..=20 {
            spectrum[k * 200] = 1.0;
        }
        l2_normalize(&mut spectrum);
        let (f0, score) = srh_score(&spectrum, 70, 360, 4);
        assert_eq!(f0, 200);
        assert!(score > 0.0);
    }

    #[test]
    fn utterance_rules() {
        let cfg = config();
        // isolated frames are dropped, short runs padded, near runs merged
        let active = [3, 20, 21, 22, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41];
        let found = find_utterances(&active, 60, &cfg);
        // [20,22] len 3 -> pad 5 -> [15,27]; [30,41] len 12 kept; gap 3 -> merged
        assert_eq!(found, vec![(15, 41)]);
    }

    #[test]
    fn padding_outside_bounds_drops_the_run() {
        let cfg = config();
        assert!(find_utterances(&[1, 2, 3], 40, &cfg).is_empty());
        assert_eq!(find_utterances(&[10, 11, 12], 40, &cfg), vec![(5, 17)]);
        assert!(find_utterances(&[35, 36, 37], 40, &cfg).is_empty());
    }

    #[test]
    fn two_frame_runs_count_as_two_frames() {
        let cfg = config();
        // [10,11] spans 2 frames, meets min_active_frames and is padded by 5 per side
        assert_eq!(find_utterances(&[10, 11], 40, &cfg), vec![(5, 16)]);
        // 12 consecutive frames already meet min_utterance_frames
        let full: Vec<usize> = (10..22).collect();
        assert_eq!(find_utterances(&full, 40, &cfg), vec![(10, 21)]);
    }

    #[test]
    fn silence_has_no_voiced_activity() {
        let audio = silence(Duration::from_secs(3), FS);
        let track = audio.voicing_strength(&config()).unwrap();
        assert!(!track.is_empty());
        assert!(track.active_frames(config().threshold).is_empty());
        assert!(matches!(
            audio.voiced_level_db(&config()),
            Err(CabinMixError::Processing(ProcessingError::NoVoicedActivity { .. }))
        ));
    }

    #[test]
    fn active_frames_cluster_on_the_voiced_burst() {
        let audio = voiced_burst();
        let cfg = config();
        let track = audio.voicing_strength(&cfg).unwrap();
        let active = track.active_frames(cfg.threshold);
        assert!(active.len() >= 12, "only {} active frames", active.len());

        // half an analysis frame plus one LPC frame of slack around the burst
        let slack = 1440 + 400;
        for &idx in &active {
            let c = track.centers[idx];
            assert!(c + slack >= 16000 && c <= 32000 + slack, "frame at {c} is outside the burst");
        }

        let segments = audio.voiced_segments(&cfg).unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn tone_activity_stays_within_the_tone() {
        let cfg = config();
        // a tone is mostly whitened by the LPC residual; whatever survives lies on the tone
        let slack = 1440 + 400;
        for frequency in [100.0, 160.0, 200.0, 300.0] {
            let track = tone_burst(frequency).voicing_strength(&cfg).unwrap();
            for idx in track.active_frames(cfg.threshold) {
                let c = track.centers[idx];
                assert!(
                    c + slack >= 16000 && c <= 32000 + slack,
                    "{frequency} Hz frame at {c} is outside the tone"
                );
            }
        }

        let track = tone_burst(200.0).voicing_strength(&cfg).unwrap();
        assert!(!track.active_frames(cfg.threshold).is_empty());
    }

    #[test]
    fn whitened_tone_has_no_voiced_level() {
        assert!(matches!(
            tone_burst(160.0).voiced_level_db(&config()),
            Err(CabinMixError::Processing(ProcessingError::NoVoicedActivity { .. }))
        ));
    }

    #[test]
    fn voiced_level_ignores_surrounding_silence() {
        let audio = voiced_burst();
        let voiced = audio.voiced_level_db(&config()).unwrap();
        let whole = audio.level_db().unwrap();
        // pulses of 0.5 every 100 samples: rms = 0.05
        assert!(voiced > whole + 3.0);
        assert_approx_eq!(voiced, 20.0 * 0.05_f64.log10(), 0.06);
    }

    #[test]
    fn multichannel_input_is_rejected() {
        let audio = AudioSamples::zeros(2, 16000, FS);
        assert!(matches!(
            audio.voicing_strength(&config()),
            Err(CabinMixError::Layout(LayoutError::NotMono { .. }))
        ));
    }
}
