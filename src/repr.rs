//! Core signal representation.
//!
//! [`AudioSamples`] owns its samples in a channel-major `ndarray::Array2<f64>`
//! (one row per channel) together with the sample rate. Every operation in the crate
//! takes signals by reference and returns freshly allocated results; no component
//! keeps a signal between calls.

use std::fmt::Display;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

/// A multichannel signal paired with its sample rate.
///
/// # Examples
/// ```
/// use cabin_mix::AudioSamples;
/// use ndarray::array;
///
/// let mono = AudioSamples::new_mono(array![0.1, 0.5, -0.3], 16000);
/// assert_eq!(mono.num_channels(), 1);
///
/// let stereo = AudioSamples::new_multi_channel(array![[0.1, 0.2], [0.3, 0.4]], 16000);
/// assert_eq!(stereo.samples_per_channel(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSamples {
    data: Array2<f64>,
    sample_rate: u32,
}

impl AudioSamples {
    /// Creates a single-channel signal.
    pub fn new_mono(data: Array1<f64>, sample_rate: u32) -> Self {
        Self {
            data: data.insert_axis(Axis(0)),
            sample_rate,
        }
    }

    /// Creates a signal from channel-major data (`channels × samples`).
    pub const fn new_multi_channel(data: Array2<f64>, sample_rate: u32) -> Self {
        Self { data, sample_rate }
    }

    /// Creates a signal from frame-major data (`samples × channels`), the layout in
    /// which codec readers usually deliver multichannel recordings.
    pub fn from_frames(frames: ArrayView2<'_, f64>, sample_rate: u32) -> Self {
        Self {
            data: frames.t().to_owned(),
            sample_rate,
        }
    }

    /// Creates a signal from one vector per channel. Returns `None` when the channels
    /// differ in length.
    pub fn from_channels(channels: Vec<Vec<f64>>, sample_rate: u32) -> Option<Self> {
        let n_channels = channels.len();
        let len = channels.first().map_or(0, Vec::len);
        if channels.iter().any(|c| c.len() != len) {
            return None;
        }
        let flat: Vec<f64> = channels.into_iter().flatten().collect();
        Array2::from_shape_vec((n_channels, len), flat)
            .ok()
            .map(|data| Self { data, sample_rate })
    }

    /// Creates a silent signal.
    pub fn zeros(channels: usize, samples: usize, sample_rate: u32) -> Self {
        Self {
            data: Array2::zeros((channels, samples)),
            sample_rate,
        }
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples in each channel.
    pub fn samples_per_channel(&self) -> usize {
        self.data.ncols()
    }

    /// Number of samples over all channels.
    pub fn total_samples(&self) -> usize {
        self.data.len()
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples_per_channel() as f64 / f64::from(self.sample_rate)
    }

    /// True when the signal has exactly one channel.
    pub fn is_mono(&self) -> bool {
        self.num_channels() == 1
    }

    /// True when the signal holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View of a single channel.
    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_channels()).then(|| self.data.row(index))
    }

    /// View of the only channel of a mono signal.
    pub fn as_mono(&self) -> Option<ArrayView1<'_, f64>> {
        if self.is_mono() {
            self.channel(0)
        } else {
            None
        }
    }

    /// Channel-major view of all samples.
    pub fn as_view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Consumes the signal and returns its channel-major data.
    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    /// Frame-major copy (`samples × channels`).
    pub fn to_frames(&self) -> Array2<f64> {
        self.data.t().to_owned()
    }

    /// Iterates over channel views.
    pub fn channels(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.data.axis_iter(Axis(0))
    }

    /// Multiplies every sample by `gain`.
    pub fn scale(&mut self, gain: f64) {
        self.data.mapv_inplace(|x| x * gain);
    }

    /// Multiplies each channel by its own gain. Extra gains are ignored; channels
    /// without a gain are left untouched.
    pub fn scale_channels(&mut self, gains: &[f64]) {
        for (mut row, &gain) in self.data.axis_iter_mut(Axis(0)).zip(gains) {
            row.mapv_inplace(|x| x * gain);
        }
    }

    /// Copy of the first `len` samples of every channel. A longer `len` returns the
    /// whole signal.
    pub fn truncated(&self, len: usize) -> Self {
        let len = len.min(self.samples_per_channel());
        Self {
            data: self.data.slice(s![.., ..len]).to_owned(),
            sample_rate: self.sample_rate,
        }
    }

    /// Element-wise sum with another signal of identical shape.
    pub fn add(&self, other: &Self) -> Option<Self> {
        if self.data.dim() != other.data.dim() || self.sample_rate != other.sample_rate {
            return None;
        }
        Some(Self {
            data: &self.data + &other.data,
            sample_rate: self.sample_rate,
        })
    }
}

impl Display for AudioSamples {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AudioSamples: {} ch × {} samples @ {} Hz",
            self.num_channels(),
            self.samples_per_channel(),
            self.sample_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn frame_major_round_trip_keeps_channel_order() {
        let frames = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let audio = AudioSamples::from_frames(frames.view(), 8000);
        assert_eq!(audio.num_channels(), 2);
        assert_eq!(audio.samples_per_channel(), 3);
        assert_eq!(audio.channel(1).map(|c| c.to_vec()), Some(vec![10.0, 20.0, 30.0]));
        assert_eq!(audio.to_frames(), frames);
    }

    #[test]
    fn from_channels_rejects_ragged_input() {
        assert!(AudioSamples::from_channels(vec![vec![1.0, 2.0], vec![1.0]], 8000).is_none());
        let audio = AudioSamples::from_channels(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 8000);
        assert_eq!(audio.map(|a| a.total_samples()), Some(4));
    }

    #[test]
    fn scale_channels_applies_per_row() {
        let mut audio = AudioSamples::new_multi_channel(array![[1.0, 1.0], [1.0, 1.0]], 8000);
        audio.scale_channels(&[2.0, 0.5]);
        assert_eq!(audio.as_view(), array![[2.0, 2.0], [0.5, 0.5]].view());
    }

    #[test]
    fn truncation_clamps_to_length() {
        let audio = AudioSamples::new_mono(array![1.0, 2.0, 3.0], 8000);
        assert_eq!(audio.truncated(2).samples_per_channel(), 2);
        assert_eq!(audio.truncated(10), audio);
    }
}
