//! Level statistics for [`AudioSamples`].

use super::traits::AudioStatistics;
use crate::utils::audio_math::amplitude_to_db;
use crate::{AudioSamples, CabinMixResult, ParameterError, ProcessingError};

impl AudioStatistics for AudioSamples {
    fn energy(&self) -> f64 {
        self.as_view().iter().map(|x| x * x).sum()
    }

    fn rms(&self) -> f64 {
        let n = self.total_samples();
        if n == 0 {
            return 0.0;
        }
        (self.energy() / n as f64).sqrt()
    }

    fn channel_rms(&self, channel: usize) -> CabinMixResult<f64> {
        let samples = self.channel(channel).ok_or_else(|| {
            ParameterError::out_of_range("channel", channel, 0, self.num_channels().saturating_sub(1))
        })?;
        if samples.is_empty() {
            return Ok(0.0);
        }
        let energy: f64 = samples.iter().map(|x| x * x).sum();
        Ok((energy / samples.len() as f64).sqrt())
    }

    fn level_db(&self) -> CabinMixResult<f64> {
        amplitude_to_db(self.rms())
            .ok_or_else(|| ProcessingError::ZeroEnergy { operation: "level_db" }.into())
    }

    fn channel_level_db(&self, channel: usize) -> CabinMixResult<f64> {
        let rms = self.channel_rms(channel)?;
        amplitude_to_db(rms)
            .ok_or_else(|| ProcessingError::ZeroEnergy { operation: "channel_level_db" }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;
    use crate::CabinMixError;
    use ndarray::array;

    #[test]
    fn rms_flattens_channels() {
        let audio = AudioSamples::new_multi_channel(array![[1.0, -1.0], [3.0, -3.0]], 8000);
        assert_approx_eq!(audio.rms(), 5.0_f64.sqrt(), 1e-12);
        assert_approx_eq!(audio.channel_rms(1).unwrap(), 3.0, 1e-12);
    }

    #[test]
    fn unit_square_wave_is_zero_db() {
        let audio = AudioSamples::new_mono(array![1.0, -1.0, 1.0, -1.0], 8000);
        assert!(audio.level_db().unwrap().abs() < 1e-12);
    }

    #[test]
    fn silence_has_no_level() {
        let audio = AudioSamples::zeros(2, 100, 8000);
        assert!(matches!(
            audio.level_db(),
            Err(CabinMixError::Processing(ProcessingError::ZeroEnergy { .. }))
        ));
        assert!(audio.channel_level_db(0).is_err());
    }

    #[test]
    fn missing_channel_is_a_parameter_error() {
        let audio = AudioSamples::zeros(2, 10, 8000);
        assert!(matches!(audio.channel_rms(2), Err(CabinMixError::Parameter(_))));
    }
}
