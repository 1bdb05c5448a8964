//! Component rendering and mixture assembly.

use std::cmp::Ordering;

use ndarray::Array1;
use num_complex::Complex;

use super::calibration::LevelCalibrator;
use super::catalog::AssetCatalog;
use super::condition::{AssetType, ChannelSelection, ConditionKey, DrivingCondition, split_condition_name};
use super::geometry::steering_vector;
use super::profile::{CarProfile, CorrectionGains};
use crate::{
    AudioChannelOps, AudioSamples, CabinMixResult, CatalogError, LayoutError, ParameterError, ProcessingError,
    match_duration,
};

/// Speech effort the catalog reference levels were measured at, in dB.
pub const REFERENCE_EFFORT_DB: f64 = 72.5;

/// Ventilation fan levels with recordings.
pub const VENTILATION_LEVELS: std::ops::RangeInclusive<u8> = 1..=3;

/// Everything needed to render one mixture.
///
/// Speech and playback are produced only when both the level and the source signal
/// are present; a level without its source is rejected.
#[derive(Debug, Clone)]
pub struct MixtureRequest {
    /// Microphone setup to render for.
    pub mic_setup: String,
    /// Driving condition shared by all components.
    pub condition: DrivingCondition,
    /// Talker position, required for speech.
    pub position: Option<String>,
    /// Rendered microphones.
    pub channels: ChannelSelection,
    /// Speech effort in dB.
    pub speech_effort_db: Option<f64>,
    /// Dry speech recording.
    pub dry_speech: Option<AudioSamples>,
    /// Playback level at the reference microphone in dB(A).
    pub playback_level_db: Option<f64>,
    /// Radio program material.
    pub playback_audio: Option<AudioSamples>,
    /// Ventilation fan level.
    pub ventilation_level: Option<u8>,
    /// Apply the per-microphone correction gains.
    pub use_correction_gains: bool,
}

impl MixtureRequest {
    /// Noise-only request on every microphone with correction gains enabled.
    pub fn new(mic_setup: impl Into<String>, condition: DrivingCondition) -> Self {
        Self {
            mic_setup: mic_setup.into(),
            condition,
            position: None,
            channels: ChannelSelection::All,
            speech_effort_db: None,
            dry_speech: None,
            playback_level_db: None,
            playback_audio: None,
            ventilation_level: None,
            use_correction_gains: true,
        }
    }

    /// Sets the talker position.
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Sets the rendered microphones.
    pub fn with_channels(mut self, channels: impl Into<ChannelSelection>) -> Self {
        self.channels = channels.into();
        self
    }

    /// Adds speech at `effort_db`.
    pub fn with_speech(mut self, effort_db: f64, dry: AudioSamples) -> Self {
        self.speech_effort_db = Some(effort_db);
        self.dry_speech = Some(dry);
        self
    }

    /// Adds radio playback at `level_db`.
    pub fn with_playback(mut self, level_db: f64, audio: AudioSamples) -> Self {
        self.playback_level_db = Some(level_db);
        self.playback_audio = Some(audio);
        self
    }

    /// Adds ventilation noise at a fan level.
    pub fn with_ventilation(mut self, level: u8) -> Self {
        self.ventilation_level = Some(level);
        self
    }

    /// Disables the correction gains.
    pub fn without_correction_gains(mut self) -> Self {
        self.use_correction_gains = false;
        self
    }
}

/// Duration-matched components of one mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct MixtureComponents {
    noise: AudioSamples,
    speech: Option<AudioSamples>,
    playback: Option<AudioSamples>,
    ventilation: Option<AudioSamples>,
}

impl MixtureComponents {
    /// Driving noise.
    pub const fn noise(&self) -> &AudioSamples {
        &self.noise
    }

    /// Calibrated speech, if requested.
    pub const fn speech(&self) -> Option<&AudioSamples> {
        self.speech.as_ref()
    }

    /// Calibrated radio playback, if requested.
    pub const fn playback(&self) -> Option<&AudioSamples> {
        self.playback.as_ref()
    }

    /// Ventilation noise, if requested.
    pub const fn ventilation(&self) -> Option<&AudioSamples> {
        self.ventilation.as_ref()
    }

    /// Number of components, noise included.
    pub fn len(&self) -> usize {
        1 + [&self.speech, &self.playback, &self.ventilation]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }

    /// Always false; a mixture carries at least the noise.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Components in the order noise, speech, playback, ventilation.
    pub fn into_vec(self) -> Vec<AudioSamples> {
        std::iter::once(self.noise)
            .chain(self.speech)
            .chain(self.playback)
            .chain(self.ventilation)
            .collect()
    }

    /// Sum of all components.
    pub fn mixture(&self) -> CabinMixResult<AudioSamples> {
        [&self.speech, &self.playback, &self.ventilation]
            .into_iter()
            .flatten()
            .try_fold(self.noise.clone(), |acc, component| {
                acc.add(component).ok_or_else(|| {
                    ProcessingError::algorithm_failure("mixture", "components differ in shape").into()
                })
            })
    }
}

/// Renders calibrated in-car mixtures from a catalog of recorded assets.
#[derive(Debug, Clone)]
pub struct MixtureSynthesizer<C> {
    catalog: C,
    profile: CarProfile,
    calibrator: LevelCalibrator,
}

impl<C: AssetCatalog> MixtureSynthesizer<C> {
    /// Synthesizer measuring plain A-weighted RMS.
    pub fn new(catalog: C, profile: CarProfile) -> Self {
        Self {
            catalog,
            profile,
            calibrator: LevelCalibrator::default(),
        }
    }

    /// Replaces the level calibrator.
    pub fn with_calibrator(mut self, calibrator: LevelCalibrator) -> Self {
        self.calibrator = calibrator;
        self
    }

    /// The asset catalog.
    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    /// The vehicle configuration.
    pub const fn profile(&self) -> &CarProfile {
        &self.profile
    }

    /// The level calibrator.
    pub const fn calibrator(&self) -> &LevelCalibrator {
        &self.calibrator
    }

    /// Speaker positions with impulse responses on `mic_setup`, in natural order.
    pub fn speaker_locations(&self, mic_setup: &str) -> CabinMixResult<Vec<String>> {
        self.require_setup(mic_setup)?;
        let mut locations: Vec<String> = self
            .catalog
            .list_conditions(mic_setup, AssetType::Ir)?
            .iter()
            .filter_map(|name| split_condition_name(name).map(|(base, _)| base.to_string()))
            .collect();
        locations.sort_by(|a, b| natural_cmp(a, b));
        locations.dedup();
        Ok(locations)
    }

    /// Steering vector of the array towards a speaker position.
    pub fn steering_vector_for(&self, position: &str, frequency: f64) -> CabinMixResult<[Complex<f64>; 8]> {
        let angle = self.profile.speaker_angle(position)?;
        Ok(steering_vector(frequency, angle))
    }

    /// Speech from `position` rendered at `effort_db`.
    ///
    /// The target level at the reference microphone is the catalog reference level
    /// for the position shifted by `effort_db - 72.5`.
    #[tracing::instrument(skip(self, dry, channels), fields(car = %self.profile))]
    pub fn speech(
        &self,
        mic_setup: &str,
        position: &str,
        condition: &DrivingCondition,
        effort_db: f64,
        dry: &AudioSamples,
        channels: &ChannelSelection,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        self.require_setup(mic_setup)?;
        if !self.speaker_locations(mic_setup)?.iter().any(|p| p == position) {
            return Err(CatalogError::UnknownLocation {
                mic_setup: mic_setup.to_string(),
                location: position.to_string(),
            }
            .into());
        }
        non_negative("speech effort", effort_db)?;
        let reference = self.profile.reference_mic(mic_setup)?;

        let key = ConditionKey::Speaker {
            position: position.to_string(),
            window: condition.window(),
        };
        let target_db = self.catalog.reference_level(mic_setup, &key)? + (effort_db - REFERENCE_EFFORT_DB);
        self.render_calibrated(mic_setup, reference, &key, dry, channels, target_db, 0.0, use_correction_gains)
    }

    /// Radio playback rendered at `level_db` dB(A) at the reference microphone.
    #[tracing::instrument(skip(self, audio, channels), fields(car = %self.profile))]
    pub fn playback(
        &self,
        mic_setup: &str,
        condition: &DrivingCondition,
        level_db: f64,
        audio: &AudioSamples,
        channels: &ChannelSelection,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        self.require_setup(mic_setup)?;
        non_negative("playback level", level_db)?;
        let reference = self.profile.reference_mic(mic_setup)?;
        let offset_db = self.profile.playback_offsets.offset(reference)?;
        let key = ConditionKey::Playback {
            window: condition.window(),
        };
        self.render_calibrated(mic_setup, reference, &key, audio, channels, level_db, offset_db, use_correction_gains)
    }

    /// Ventilation recording at fan `level`.
    #[tracing::instrument(skip(self, channels), fields(car = %self.profile))]
    pub fn ventilation(
        &self,
        mic_setup: &str,
        condition: &DrivingCondition,
        level: u8,
        channels: &ChannelSelection,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        self.require_setup(mic_setup)?;
        if !VENTILATION_LEVELS.contains(&level) {
            return Err(ParameterError::out_of_range(
                "ventilation level",
                level,
                VENTILATION_LEVELS.start(),
                VENTILATION_LEVELS.end(),
            )
            .into());
        }
        let key = ConditionKey::Ventilation {
            level,
            window: condition.window(),
        };
        self.recording(mic_setup, &key, channels, use_correction_gains)
    }

    /// Driving noise recorded in `condition`.
    #[tracing::instrument(skip(self, channels), fields(car = %self.profile))]
    pub fn noise(
        &self,
        mic_setup: &str,
        condition: &DrivingCondition,
        channels: &ChannelSelection,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        self.require_setup(mic_setup)?;
        self.recording(mic_setup, &condition.noise_key(), channels, use_correction_gains)
    }

    /// Renders every requested component and aligns them to a common length.
    ///
    /// The reference length is that of the first present component in the order
    /// speech, playback, ventilation, noise.
    #[tracing::instrument(skip_all, fields(car = %self.profile, mic_setup = %request.mic_setup, condition = %request.condition))]
    pub fn components(&self, request: &MixtureRequest) -> CabinMixResult<MixtureComponents> {
        let MixtureRequest {
            mic_setup,
            condition,
            channels,
            use_correction_gains,
            ..
        } = request;
        let gains = *use_correction_gains;

        let speech = match (request.speech_effort_db, &request.dry_speech) {
            (Some(effort), Some(dry)) => {
                let position = request
                    .position
                    .as_deref()
                    .ok_or_else(|| ParameterError::invalid_value("position", "required when speech is requested"))?;
                Some(self.speech(mic_setup, position, condition, effort, dry, channels, gains)?)
            }
            (Some(_), None) => return Err(ParameterError::MissingSource { component: "speech" }.into()),
            (None, Some(_)) => {
                tracing::warn!("dry speech given without an effort level, speech skipped");
                None
            }
            (None, None) => None,
        };

        let playback = match (request.playback_level_db, &request.playback_audio) {
            (Some(level), Some(audio)) => Some(self.playback(mic_setup, condition, level, audio, channels, gains)?),
            (Some(_), None) => return Err(ParameterError::MissingSource { component: "playback" }.into()),
            (None, Some(_)) => {
                tracing::warn!("playback audio given without a level, playback skipped");
                None
            }
            (None, None) => None,
        };

        let ventilation = request
            .ventilation_level
            .map(|level| self.ventilation(mic_setup, condition, level, channels, gains))
            .transpose()?;

        let noise = self.noise(mic_setup, condition, channels, gains)?;

        let flags = (speech.is_some(), playback.is_some(), ventilation.is_some());
        let ordered: Vec<AudioSamples> = speech
            .into_iter()
            .chain(playback)
            .chain(ventilation)
            .chain(std::iter::once(noise))
            .collect();
        let mut matched = match_duration(ordered)?.into_iter();

        let mut take = |present: bool| if present { matched.next() } else { None };
        let speech = take(flags.0);
        let playback = take(flags.1);
        let ventilation = take(flags.2);
        let noise = matched
            .next()
            .ok_or_else(|| ProcessingError::algorithm_failure("components", "duration matcher dropped the noise"))?;

        let components = MixtureComponents {
            noise,
            speech,
            playback,
            ventilation,
        };
        tracing::debug!(
            components = components.len(),
            samples = components.noise.samples_per_channel(),
            "assembled mixture components"
        );
        Ok(components)
    }

    fn require_setup(&self, mic_setup: &str) -> CabinMixResult<()> {
        if self.catalog.has_mic_setup(mic_setup) {
            Ok(())
        } else {
            Err(CatalogError::UnknownMicSetup(mic_setup.to_string()).into())
        }
    }

    fn correction_gains(&self, enabled: bool) -> Option<&CorrectionGains> {
        enabled.then_some(&self.profile.correction_gains)
    }

    /// Convolves a source with the IR stored under `key` and calibrates it on the
    /// reference microphone.
    fn render_calibrated(
        &self,
        mic_setup: &str,
        reference: usize,
        key: &ConditionKey,
        source: &AudioSamples,
        channels: &ChannelSelection,
        target_db: f64,
        offset_db: f64,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        let ir = self.catalog.load(mic_setup, key.asset_type(), &key.name())?;
        let selected = channels.resolve(ir.num_channels())?;
        let ir_reference = ir.channel(reference).ok_or_else(|| {
            ParameterError::out_of_range("reference microphone", reference, 0, ir.num_channels().saturating_sub(1))
        })?;

        let source = self.prepare_source(source)?;
        let calibration = self.calibrator.calibrate(
            source.view(),
            ir_reference,
            self.catalog.sample_rate(),
            target_db,
            offset_db,
        )?;
        tracing::debug!(
            condition = %key,
            reference,
            gain = calibration.gain,
            "rendering calibrated component"
        );
        self.calibrator.render(
            source.view(),
            &ir,
            &selected,
            calibration.gain,
            self.correction_gains(use_correction_gains),
        )
    }

    /// Loads a multichannel recording, selects channels and applies correction gains.
    fn recording(
        &self,
        mic_setup: &str,
        key: &ConditionKey,
        channels: &ChannelSelection,
        use_correction_gains: bool,
    ) -> CabinMixResult<AudioSamples> {
        let recording = self.catalog.load(mic_setup, key.asset_type(), &key.name())?;
        let selected = channels.resolve(recording.num_channels())?;
        let mut out = recording.select_channels(&selected)?;
        if let Some(table) = self.correction_gains(use_correction_gains) {
            out.scale_channels(&table.gains_for(&selected)?);
        }
        tracing::trace!(condition = %key, channels = selected.len(), "loaded recording");
        Ok(out)
    }

    /// Mono source at the processing rate.
    fn prepare_source(&self, source: &AudioSamples) -> CabinMixResult<Array1<f64>> {
        let mono = self.conform_rate(source.to_mono()?)?;
        mono.as_mono().map(|m| m.to_owned()).ok_or_else(|| {
            LayoutError::NotMono {
                operation: "prepare_source",
                channels: mono.num_channels(),
            }
            .into()
        })
    }

    #[cfg(feature = "resampling")]
    fn conform_rate(&self, signal: AudioSamples) -> CabinMixResult<AudioSamples> {
        crate::resampling::resample(&signal, self.catalog.sample_rate())
    }

    #[cfg(not(feature = "resampling"))]
    fn conform_rate(&self, signal: AudioSamples) -> CabinMixResult<AudioSamples> {
        if signal.sample_rate() == self.catalog.sample_rate() {
            Ok(signal)
        } else {
            Err(CatalogError::SampleRate {
                expected: self.catalog.sample_rate(),
                actual: signal.sample_rate(),
            }
            .into())
        }
    }
}

fn non_negative(parameter: &'static str, value: f64) -> CabinMixResult<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(ParameterError::NegativeLevel { parameter, value }.into());
    }
    Ok(())
}

/// Orders names with embedded numbers numerically and letters case-insensitively,
/// so `prm10l` sorts after `prm2`.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();
    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let take_number = |it: &mut std::iter::Peekable<std::str::Chars<'_>>| {
                    let mut digits = String::new();
                    while let Some(d) = it.next_if(char::is_ascii_digit) {
                        digits.push(d);
                    }
                    digits
                };
                let (na, nb) = (take_number(&mut a), take_number(&mut b));
                let (ta, tb) = (na.trim_start_matches('0'), nb.trim_start_matches('0'));
                let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                a.next();
                b.next();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::cabin::catalog::InMemoryCatalog;
    use crate::cabin::condition::WindowState;
    use crate::utils::generation::{pulse_train, sine_wave};
    use crate::{AudioStatistics, CabinMixError, ConfigError, LevelMode, ProcessingError};
    use ndarray::Array2;
    use std::time::Duration;

    const FS: u32 = 16000;

    fn eight_channel(frequency: f64, millis: u64) -> AudioSamples {
        let tone = sine_wave(frequency, Duration::from_millis(millis), FS, 0.1);
        let mono = tone.as_mono().map(|m| m.to_vec()).unwrap();
        let channels = (0..8)
            .map(|ch| mono.iter().map(|x| x * (ch + 1) as f64).collect())
            .collect();
        AudioSamples::from_channels(channels, FS).unwrap()
    }

    fn impulse_response() -> AudioSamples {
        let mut ir = Array2::zeros((8, 32));
        for ch in 0..8 {
            ir[[ch, ch + 1]] = 0.3 + 0.1 * ch as f64;
        }
        AudioSamples::new_multi_channel(ir, FS)
    }

    fn synthesizer() -> MixtureSynthesizer<InMemoryCatalog> {
        let mut catalog = InMemoryCatalog::new(FS);
        for position in ["prm_w1", "d_w1", "prm10l_w1", "prm_w2"] {
            catalog
                .insert("array", AssetType::Ir, position, impulse_response())
                .unwrap();
        }
        for (asset, name, signal) in [
            (AssetType::RadioIr, "w1", impulse_response()),
            (AssetType::Ventilation, "v2_w1", eight_channel(300.0, 250)),
            (AssetType::Noise, "100kmh_w1", eight_channel(120.0, 400)),
        ] {
            catalog.insert("array", asset, name, signal).unwrap();
        }
        catalog.set_reference_level("array", "prm_w1", 60.0);
        catalog
            .insert("distributed", AssetType::Ir, "prm_w1", impulse_response())
            .unwrap();

        let mut gains = CorrectionGains::unity(8);
        gains.set(4, 0.5);
        let profile = CarProfile::new("Smart", "forfour", 2019)
            .with_reference_mic("array", Some(4))
            .with_reference_mic("distributed", None)
            .with_speaker_angle("prm", 0.0)
            .with_speaker_angle("d50", -28.0)
            .with_correction_gains(gains);
        MixtureSynthesizer::new(catalog, profile)
    }

    fn condition() -> DrivingCondition {
        "100kmh_w1".parse().unwrap()
    }

    fn dry() -> AudioSamples {
        sine_wave(1000.0, Duration::from_millis(500), FS, 0.1)
    }

    fn reference_level(synth: &MixtureSynthesizer<InMemoryCatalog>, signal: &AudioSamples) -> f64 {
        let reference = signal.select_channels(&[4]).unwrap();
        synth.calibrator().measure_level_db(&reference).unwrap()
    }

    #[test]
    fn speaker_locations_are_unique_and_naturally_ordered() {
        let synth = synthesizer();
        assert_eq!(
            synth.speaker_locations("array").unwrap(),
            vec!["d".to_string(), "prm".to_string(), "prm10l".to_string()]
        );
    }

    #[test]
    fn speech_reaches_reference_level_shifted_by_effort() {
        let synth = synthesizer();
        let all = ChannelSelection::All;
        let speech = synth
            .speech("array", "prm", &condition(), 72.5, &dry(), &all, false)
            .unwrap();
        assert_eq!(speech.num_channels(), 8);
        assert_eq!(speech.samples_per_channel(), 8000 + 32 - 1);
        assert_approx_eq!(reference_level(&synth, &speech), 60.0, 1e-6);

        let louder = synth
            .speech("array", "prm", &condition(), 78.5, &dry(), &all, false)
            .unwrap();
        assert_approx_eq!(reference_level(&synth, &louder), 66.0, 1e-6);
    }

    #[test]
    fn voiced_calibrator_measures_speech_activity_only() {
        let synth = synthesizer().with_calibrator(LevelCalibrator::voiced());
        assert_eq!(synth.calibrator().mode, LevelMode::VoicedRms);
        let all = ChannelSelection::All;
        let voiced = pulse_train(150.0, Duration::from_secs(3), FS, 0.5);
        let speech = synth
            .speech("array", "prm", &condition(), 72.5, &voiced, &all, false)
            .unwrap();
        assert_approx_eq!(reference_level(&synth, &speech), 60.0, 1e-6);

        assert!(matches!(
            synth.speech("array", "prm", &condition(), 72.5, &dry(), &all, false),
            Err(CabinMixError::Processing(ProcessingError::NoVoicedActivity { .. }))
        ));
    }

    #[test]
    fn correction_gains_scale_rendered_channels() {
        let synth = synthesizer();
        let speech = synth
            .speech("array", "prm", &condition(), 72.5, &dry(), &ChannelSelection::All, true)
            .unwrap();
        assert_approx_eq!(reference_level(&synth, &speech), 60.0 + 20.0 * 0.5f64.log10(), 1e-6);

        let raw = synth
            .noise("array", &condition(), &ChannelSelection::Single(4), false)
            .unwrap();
        let corrected = synth
            .noise("array", &condition(), &ChannelSelection::Single(4), true)
            .unwrap();
        assert_approx_eq!(corrected.rms(), raw.rms() * 0.5, 1e-9);
    }

    #[test]
    fn playback_level_includes_the_full_scale_offset() {
        let synth = synthesizer();
        let audio = sine_wave(500.0, Duration::from_millis(300), FS, 0.2);
        let playback = synth
            .playback("array", &condition(), 70.0, &audio, &ChannelSelection::All, false)
            .unwrap();
        let offset = synth.profile().playback_offsets.offset(4).unwrap();
        assert_approx_eq!(reference_level(&synth, &playback) + offset, 70.0, 1e-6);
    }

    #[test]
    fn components_follow_the_speech_length_with_noise_first() {
        let synth = synthesizer();
        let request = MixtureRequest::new("array", condition())
            .with_position("prm")
            .with_channels(vec![4, 0])
            .with_speech(65.0, dry())
            .with_ventilation(2);
        let components = synth.components(&request).unwrap();
        assert_eq!(components.len(), 3);
        assert!(components.playback().is_none());

        let expected_len = 8000 + 32 - 1;
        let noise = components.noise().clone();
        let parts = components.clone().into_vec();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], noise);
        for part in &parts {
            assert_eq!(part.num_channels(), 2);
            assert_eq!(part.samples_per_channel(), expected_len);
        }

        let mixture = components.mixture().unwrap();
        let sum = parts
            .iter()
            .skip(1)
            .fold(parts[0].clone(), |acc, p| acc.add(p).unwrap());
        assert_eq!(mixture, sum);
    }

    #[test]
    fn noise_only_mixture_is_the_noise() {
        let synth = synthesizer();
        let components = synth
            .components(&MixtureRequest::new("array", condition()).without_correction_gains())
            .unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components.noise().samples_per_channel(), 6400);
        assert_eq!(components.mixture().ok().as_ref(), Some(components.noise()));
    }

    #[test]
    fn invalid_requests_are_precondition_errors() {
        let synth = synthesizer();
        let cond = condition();
        let all = ChannelSelection::All;

        assert!(matches!(
            synth.noise("roof", &cond, &all, true),
            Err(CabinMixError::Catalog(CatalogError::UnknownMicSetup(_)))
        ));
        assert!(matches!(
            synth.speech("array", "fp", &cond, 60.0, &dry(), &all, true),
            Err(CabinMixError::Catalog(CatalogError::UnknownLocation { .. }))
        ));
        assert!(matches!(
            synth.speech("array", "prm", &cond, -1.0, &dry(), &all, true),
            Err(CabinMixError::Parameter(ParameterError::NegativeLevel { .. }))
        ));
        assert!(matches!(
            synth.speech("array", "prm", &cond, f64::NAN, &dry(), &all, true),
            Err(CabinMixError::Parameter(ParameterError::NegativeLevel { .. }))
        ));
        assert!(matches!(
            synth.playback("array", &cond, f64::INFINITY, &dry(), &all, true),
            Err(CabinMixError::Parameter(ParameterError::NegativeLevel { .. }))
        ));
        assert!(matches!(
            synth.ventilation("array", &cond, 4, &all, true),
            Err(CabinMixError::Parameter(ParameterError::OutOfRange { .. }))
        ));
        assert!(matches!(
            synth.noise("array", &cond, &ChannelSelection::Single(8), true),
            Err(CabinMixError::Parameter(ParameterError::InvalidChannelSelection(_)))
        ));
        assert!(matches!(
            synth.speech("distributed", "prm", &cond, 60.0, &dry(), &all, true),
            Err(CabinMixError::Config(ConfigError::NoReferenceMic(_)))
        ));

        let missing_dry = MixtureRequest {
            speech_effort_db: Some(60.0),
            ..MixtureRequest::new("array", cond.clone()).with_position("prm")
        };
        assert!(matches!(
            synth.components(&missing_dry),
            Err(CabinMixError::Parameter(ParameterError::MissingSource { component: "speech" }))
        ));
        let no_position = MixtureRequest::new("array", cond).with_speech(60.0, dry());
        assert!(synth.components(&no_position).is_err_and(|e| e.is_precondition()));
    }

    #[test]
    fn unknown_window_state_has_no_recording() {
        let synth = synthesizer();
        let cond = DrivingCondition::new("100kmh", WindowState::new(3).unwrap());
        assert!(matches!(
            synth.noise("array", &cond, &ChannelSelection::All, true),
            Err(CabinMixError::Catalog(CatalogError::UnknownCondition { .. }))
        ));
    }

    #[test]
    fn steering_vectors_use_profile_angles() {
        let synth = synthesizer();
        let v = synth.steering_vector_for("d50", 1000.0).unwrap();
        assert_eq!(v, steering_vector(1000.0, -28.0));
        assert!(matches!(
            synth.steering_vector_for("fp60", 1000.0),
            Err(CabinMixError::Config(ConfigError::MissingSpeakerAngle(_)))
        ));
    }

    #[test]
    fn natural_ordering_compares_numbers_by_value() {
        let mut names = vec!["prm10l", "prm2", "Prl", "d50", "prm"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["d50", "Prl", "prm", "prm2", "prm10l"]);
    }
}
