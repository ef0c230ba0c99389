use std::path::Path;

use hound::{SampleFormat, WavReader};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::constants::AUDIO_SAMPLE_RATE;
use crate::error::EstimatorError;

/// Reads a WAV file, mixes it down to mono and resamples it to the canonical
/// analysis rate (22 050 Hz).
///
/// # Arguments
///
/// * `path` - Path to the audio file.
///
/// # Returns
///
/// * Mono samples at 22 050 Hz.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<Vec<f32>, EstimatorError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let duration = reader.duration() as usize;
    let channels = spec.channels as usize;

    if duration == 0 {
        return Err(EstimatorError::InvalidInput(
            "audio file contains no samples".to_string(),
        ));
    }

    let interleaved: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max_sample_value = 2.0f64.powi(spec.bits_per_sample as i32 - 1) - 1.0;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_sample_value))
                .collect::<Result<_, _>>()?
        }
    };

    // Average across channels to get a mono signal
    let mono: Vec<f64> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect();

    if spec.sample_rate as usize == AUDIO_SAMPLE_RATE {
        return Ok(mono.into_iter().map(|s| s as f32).collect());
    }

    log::debug!(
        "resampling {} frames from {} Hz to {} Hz",
        mono.len(),
        spec.sample_rate,
        AUDIO_SAMPLE_RATE
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f64>::new(
        AUDIO_SAMPLE_RATE as f64 / spec.sample_rate as f64,
        2.0,
        params,
        mono.len(),
        1,
    )?;
    let resampled = resampler.process(&[mono], None)?;

    Ok(resampled[0].iter().map(|&s| s as f32).collect())
}
