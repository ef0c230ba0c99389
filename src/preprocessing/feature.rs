use std::path::Path;

use ndarray::{concatenate, s, Array3, Array4, Axis};

use crate::constants::{WINDOW_FRAMES, WINDOW_HOP};
use crate::error::EstimatorError;
use crate::preprocessing::cqt::CqtTransform;
use crate::preprocessing::load_audio::load_audio;

/// Loads an audio file and turns it into a batch of overlapping constant-Q
/// analysis windows, one batch entry per window.
///
/// The file is resampled to 22 050 Hz and transformed with a constant-Q
/// spectrogram covering E1 + 7 octaves at two bins per semitone. Shorter
/// excerpts are zero padded so that at least one window is always produced.
///
/// With `zero_pad`, `frames / 2` zero frames are added at the front and at
/// the back, which makes windows centered at the very start and end of the
/// recording possible (continuous key tracking).
///
/// # Arguments
///
/// * `path` - Path to the audio file.
/// * `frames` - Time frames per window, 60 for the pretrained models.
/// * `hop_length` - Hop between window offsets, 30 or shorter.
/// * `zero_pad` - Adds `frames / 2` zero frames at the front and back.
///
/// # Returns
///
/// * Feature tensor of shape `(windows, 168, frames, 1)` for the whole file.
pub fn read_features<P: AsRef<Path>>(
    path: P,
    frames: usize,
    hop_length: usize,
    zero_pad: bool,
) -> Result<Array4<f32>, EstimatorError> {
    if frames == 0 {
        return Err(EstimatorError::InvalidInput(
            "window length must be at least one frame".to_string(),
        ));
    }
    if hop_length == 0 {
        return Err(EstimatorError::InvalidInput(
            "hop length must be at least one frame".to_string(),
        ));
    }

    let samples = load_audio(path)?;
    let transform = CqtTransform::new();
    let mut data = transform.magnitude_spectrogram(&samples);

    if zero_pad {
        data = add_edge_zeros(&data, frames);
    }

    if data.shape()[1] < frames {
        data = ensure_min_length(&data, frames);
    }

    log::debug!(
        "windowing {} spectral frames into {}-frame windows with hop {}",
        data.shape()[1],
        frames,
        hop_length
    );

    to_sliding_windows(&data, frames, hop_length)
}

/// Reads features with the defaults the pretrained models expect: 60-frame
/// windows with 50% overlap and no edge padding.
pub fn read_default_features<P: AsRef<Path>>(path: P) -> Result<Array4<f32>, EstimatorError> {
    read_features(path, WINDOW_FRAMES, WINDOW_HOP, false)
}

/// Extends the time axis by `zeros` frames in total, shifting the data so
/// that `zeros / 2` zero frames sit before and after it.
fn add_edge_zeros(data: &Array3<f32>, zeros: usize) -> Array3<f32> {
    let (bins, time_frames, channels) = data.dim();
    let mut padded = Array3::zeros((bins, time_frames + zeros, channels));
    padded
        .slice_mut(s![.., zeros / 2..time_frames + zeros / 2, ..])
        .assign(data);
    padded
}

/// Right-pads the time axis with zero frames up to exactly `length` frames.
fn ensure_min_length(data: &Array3<f32>, length: usize) -> Array3<f32> {
    let (bins, time_frames, channels) = data.dim();
    let mut padded = Array3::zeros((bins, length, channels));
    padded.slice_mut(s![.., 0..time_frames, ..]).assign(data);
    padded
}

/// Cuts the spectral tensor into overlapping windows and stacks them along a
/// new leading batch axis, in increasing-offset order.
///
/// Windows start at offsets `0, hop, 2*hop, ...` for as long as a full
/// window still fits; each one is an independent copy.
fn to_sliding_windows(
    data: &Array3<f32>,
    window_length: usize,
    hop_length: usize,
) -> Result<Array4<f32>, EstimatorError> {
    let total_frames = data.shape()[1];

    let mut windows = Vec::new();
    let mut offset = 0;
    while offset + window_length <= total_frames {
        let window = data
            .slice(s![.., offset..offset + window_length, ..])
            .to_owned();
        windows.push(window.insert_axis(Axis(0)));
        offset += hop_length;
    }

    let views: Vec<_> = windows.iter().map(|w| w.view()).collect();
    concatenate(Axis(0), &views).map_err(|e| EstimatorError::InvalidInput(e.to_string()))
}
