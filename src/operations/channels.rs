//! Channel selection and mono mixdown.

use ndarray::Axis;

use super::traits::AudioChannelOps;
use crate::{AudioSamples, CabinMixResult, LayoutError, ParameterError, ProcessingError};

impl AudioChannelOps for AudioSamples {
    fn select_channels(&self, channels: &[usize]) -> CabinMixResult<Self> {
        if channels.is_empty() {
            return Err(ParameterError::InvalidChannelSelection("no channel selected".to_string()).into());
        }
        if let Some(&bad) = channels.iter().find(|&&c| c >= self.num_channels()) {
            return Err(ParameterError::InvalidChannelSelection(format!(
                "channel {bad} does not exist, signal has {} channels",
                self.num_channels()
            ))
            .into());
        }
        let data = self.as_view().select(Axis(0), channels);
        Ok(Self::new_multi_channel(data, self.sample_rate()))
    }

    fn to_mono(&self) -> CabinMixResult<Self> {
        if self.num_channels() == 1 {
            return Ok(self.clone());
        }
        if self.num_channels() == 0 {
            return Err(LayoutError::EmptyData { operation: "to_mono" }.into());
        }
        let mono = self.as_view().mean_axis(Axis(0)).ok_or_else(|| {
            ProcessingError::algorithm_failure("channel_averaging", "failed to average channels")
        })?;
        Ok(Self::new_mono(mono, self.sample_rate()))
    }
}
