//! Sample-rate conversion for assets stored at a different rate than the processing
//! rate. Uses rubato's sinc resampler.

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::{AudioSamples, CabinMixResult, LayoutError, ParameterError, ProcessingError};

const CHUNK: usize = 4096;

fn append(chunk: Vec<Vec<f64>>, output: &mut [Vec<f64>]) {
    for (dst, src) in output.iter_mut().zip(chunk) {
        dst.extend(src);
    }
}

fn resampler_error(operation: &'static str, e: impl std::fmt::Display) -> ProcessingError {
    ProcessingError::algorithm_failure(operation, e.to_string())
}

/// Resamples every channel of `audio` to `target_sample_rate`.
///
/// The output has `round(len · target / source)` samples per channel; the resampler's
/// group delay is removed so the signal stays time-aligned.
///
/// # Errors
/// Empty input, a zero target rate, or an internal resampler failure.
pub fn resample(audio: &AudioSamples, target_sample_rate: u32) -> CabinMixResult<AudioSamples> {
    if target_sample_rate == 0 || audio.sample_rate() == 0 {
        return Err(ParameterError::invalid_value("sample_rate", "must be positive").into());
    }
    if audio.is_empty() {
        return Err(LayoutError::EmptyData { operation: "resample" }.into());
    }
    if audio.sample_rate() == target_sample_rate {
        return Ok(audio.clone());
    }

    let n = audio.samples_per_channel();
    let channels = audio.num_channels();
    let ratio = f64::from(target_sample_rate) / f64::from(audio.sample_rate());
    let expected = (n as f64 * ratio).round() as usize;

    let mut resampler = SincFixedIn::<f64>::new(
        ratio,
        2.0,
        SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        CHUNK.min(n),
        channels,
    )
    .map_err(|e| resampler_error("resampler_setup", e))?;

    let delay = resampler.output_delay();
    let input: Vec<Vec<f64>> = audio.channels().map(|c| c.to_vec()).collect();
    let mut output: Vec<Vec<f64>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut pos = 0;
    while pos < n {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(n);
        let chunk: Vec<&[f64]> = input.iter().map(|c| &c[pos..end]).collect();
        let out = if end - pos == needed {
            resampler.process(&chunk, None)
        } else {
            resampler.process_partial(Some(chunk.as_slice()), None)
        }
        .map_err(|e| resampler_error("resample", e))?;
        append(out, &mut output);
        pos = end;
    }

    while output.first().map_or(0, Vec::len) < expected + delay {
        let out = resampler
            .process_partial::<&[f64]>(None, None)
            .map_err(|e| resampler_error("resample_flush", e))?;
        if out.first().is_none_or(Vec::is_empty) {
            break;
        }
        append(out, &mut output);
    }

    let trimmed: Vec<Vec<f64>> = output
        .into_iter()
        .map(|mut ch| {
            ch.resize(expected + delay, 0.0);
            ch.split_off(delay)
        })
        .collect();

    tracing::debug!(
        from = audio.sample_rate(),
        to = target_sample_rate,
        samples = expected,
        "resampled signal"
    );

    AudioSamples::from_channels(trimmed, target_sample_rate).ok_or_else(|| {
        resampler_error("resample", "channels came back with different lengths").into()
    })
}
