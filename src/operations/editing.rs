//! Duration matching by truncation and equal-power crossfade looping.
//!
//! A signal shorter than its target is split into `start`, `middle` and `end`
//! segments of `c`, `len - 2c` and `c` samples, where `c` is one second (or half the
//! signal when it is shorter than two seconds). The crossfade `cf = start·sin + end·cos`
//! uses the first quarter of a `4c`-sample sine/cosine period, so the tail fades out
//! while the head fades in. The loop is `start, middle, cf, middle, cf, …`, finishing
//! with `end` when another crossfade would overshoot, and is cut to the target length.

use std::f64::consts::FRAC_PI_2;

use ndarray::{Array2, ArrayView2, s};

use super::traits::AudioEditing;
use crate::{AudioSamples, CabinMixResult, LayoutError, ParameterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Start,
    Middle,
    Crossfade,
    End,
}

/// Order of segments that reaches `target_len` for a signal of `len` samples.
fn loop_plan(len: usize, fade: usize, target_len: usize) -> Vec<Piece> {
    let middle = len - 2 * fade;
    let mut plan = vec![Piece::Start, Piece::Middle, Piece::Crossfade];
    let mut total = len;
    while total < target_len {
        plan.push(Piece::Middle);
        total += middle;
        if total + fade > target_len {
            plan.push(Piece::End);
        } else {
            plan.push(Piece::Crossfade);
        }
        total += fade;
    }
    plan
}

fn crossfade(data: ArrayView2<'_, f64>, fade: usize) -> Array2<f64> {
    let len = data.ncols();
    let start = data.slice(s![.., ..fade]);
    let end = data.slice(s![.., len - fade..]);
    let mut cf = Array2::zeros((data.nrows(), fade));
    for n in 0..fade {
        let phase = FRAC_PI_2 * n as f64 / fade as f64;
        let (sine, cosine) = phase.sin_cos();
        for ch in 0..data.nrows() {
            cf[[ch, n]] = start[[ch, n]] * sine + end[[ch, n]] * cosine;
        }
    }
    cf
}

impl AudioEditing for AudioSamples {
    fn loop_to_length(&self, target_len: usize) -> CabinMixResult<Self> {
        let len = self.samples_per_channel();
        if len >= target_len {
            return Ok(self.truncated(target_len));
        }
        if len == 0 {
            return Err(LayoutError::EmptyData {
                operation: "loop_to_length",
            }
            .into());
        }

        let fade = (self.sample_rate() as usize).min(len / 2);
        let data = self.as_view();
        let cf = crossfade(data, fade);

        let mut out = Array2::zeros((self.num_channels(), target_len));
        let mut written = 0;
        for piece in loop_plan(len, fade, target_len) {
            let segment = match piece {
                Piece::Start => data.slice(s![.., ..fade]),
                Piece::Middle => data.slice(s![.., fade..len - fade]),
                Piece::Crossfade => cf.view(),
                Piece::End => data.slice(s![.., len - fade..]),
            };
            let take = segment.ncols().min(target_len - written);
            out.slice_mut(s![.., written..written + take])
                .assign(&segment.slice(s![.., ..take]));
            written += take;
            if written == target_len {
                break;
            }
        }

        Ok(Self::new_multi_channel(out, self.sample_rate()))
    }

    fn fit_to_length(&self, target_len: usize) -> CabinMixResult<Self> {
        if self.samples_per_channel() >= target_len {
            Ok(self.truncated(target_len))
        } else {
            self.loop_to_length(target_len)
        }
    }
}

/// Aligns every signal to the length of the first one.
///
/// The first signal is returned unchanged; longer signals are truncated and shorter
/// ones looped with [`AudioEditing::loop_to_length`].
///
/// # Errors
/// - [`ParameterError`] for an empty list.
/// - [`LayoutError::ChannelMismatch`] or [`LayoutError::SampleRateMismatch`] naming the
///   first signal that disagrees with the reference.
/// - [`LayoutError::EmptyData`] when a signal that needs looping has no samples.
pub fn match_duration(signals: Vec<AudioSamples>) -> CabinMixResult<Vec<AudioSamples>> {
    let mut iter = signals.into_iter();
    let reference = iter
        .next()
        .ok_or_else(|| ParameterError::invalid_value("signals", "at least one signal is required"))?;

    let target_len = reference.samples_per_channel();
    let channels = reference.num_channels();
    let sample_rate = reference.sample_rate();

    let rest: Vec<AudioSamples> = iter.collect();
    for (offset, signal) in rest.iter().enumerate() {
        let index = offset + 1;
        if signal.num_channels() != channels {
            return Err(LayoutError::ChannelMismatch {
                index,
                expected: channels,
                actual: signal.num_channels(),
            }
            .into());
        }
        if signal.sample_rate() != sample_rate {
            return Err(LayoutError::SampleRateMismatch {
                index,
                expected: sample_rate,
                actual: signal.sample_rate(),
            }
            .into());
        }
    }

    let mut out = Vec::with_capacity(rest.len() + 1);
    out.push(reference);
    for signal in rest {
        let fitted = if signal.samples_per_channel() == target_len {
            signal
        } else {
            signal.fit_to_length(target_len)?
        };
        out.push(fitted);
    }

    tracing::trace!(signals = out.len(), target_len, "matched durations");
    Ok(out)
}
