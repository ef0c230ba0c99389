use std::sync::Arc;

use ndarray::Array3;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::constants::{
    AUDIO_SAMPLE_RATE, BINS_PER_OCTAVE, CQT_HOP_LENGTH, CQT_WINDOW_LENGTH, FMIN_MIDI, N_CQT_BINS,
};

/// Spectral kernel coefficients below this fraction of the kernel's peak
/// magnitude are dropped, leaving one contiguous support interval per bin.
const SPARSITY_THRESHOLD: f32 = 0.005;

/// One precomputed frequency-domain kernel, stored only over its support.
struct SpectralKernel {
    start: usize,
    coeffs: Vec<Complex<f32>>,
}

/// Constant-Q analyzer with precomputed kernels.
///
/// Covers 168 bins (7 octaves, 2 bins per semitone) starting at E1, with an
/// analysis frame of 8192 samples hopped by 4096. Frames are centered on
/// multiples of the hop, so the frame count for a signal of length `n` is
/// `n / 4096 + 1` regardless of content.
pub struct CqtTransform {
    fft: Arc<dyn Fft<f32>>,
    kernels: Vec<SpectralKernel>,
}

impl CqtTransform {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(CQT_WINDOW_LENGTH);

        let q_factor = 1.0 / (2.0f64.powf(1.0 / BINS_PER_OCTAVE as f64) - 1.0);
        let kernels = (0..N_CQT_BINS)
            .map(|bin| build_spectral_kernel(bin, q_factor, fft.as_ref()))
            .collect();

        CqtTransform { fft, kernels }
    }

    /// Computes the magnitude constant-Q spectrogram of a mono signal.
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono samples at 22 050 Hz.
    ///
    /// # Returns
    ///
    /// * Magnitudes of shape `(168, frames, 1)`.
    pub fn magnitude_spectrogram(&self, samples: &[f32]) -> Array3<f32> {
        let n_frames = samples.len() / CQT_HOP_LENGTH + 1;
        let mut spectrogram = Array3::zeros((N_CQT_BINS, n_frames, 1));
        let mut frame = vec![Complex::new(0.0f32, 0.0); CQT_WINDOW_LENGTH];

        let half = CQT_WINDOW_LENGTH as isize / 2;
        for t in 0..n_frames {
            let center = (t * CQT_HOP_LENGTH) as isize;

            // Gather one centered frame, zero beyond the signal edges
            for (i, slot) in frame.iter_mut().enumerate() {
                let n = center - half + i as isize;
                let value = if n >= 0 && (n as usize) < samples.len() {
                    samples[n as usize]
                } else {
                    0.0
                };
                *slot = Complex::new(value, 0.0);
            }
            self.fft.process(&mut frame);

            for (bin, kernel) in self.kernels.iter().enumerate() {
                let mut acc = Complex::new(0.0f32, 0.0);
                for (offset, k) in kernel.coeffs.iter().enumerate() {
                    acc += frame[kernel.start + offset] * k.conj();
                }
                spectrogram[[bin, t, 0]] = (acc / CQT_WINDOW_LENGTH as f32).norm();
            }
        }

        spectrogram
    }
}

impl Default for CqtTransform {
    fn default() -> Self {
        Self::new()
    }
}

/// Center frequency of a constant-Q bin in Hz.
pub fn bin_frequency(bin: usize) -> f64 {
    let fmin = 440.0 * 2.0f64.powf((FMIN_MIDI as f64 - 69.0) / 12.0);
    fmin * 2.0f64.powf(bin as f64 / BINS_PER_OCTAVE as f64)
}

/// Builds the frequency-domain kernel for one bin: a Hann-windowed complex
/// exponential of Q-derived length, centered in the analysis frame,
/// transformed and truncated to its support.
fn build_spectral_kernel(bin: usize, q_factor: f64, fft: &dyn Fft<f32>) -> SpectralKernel {
    let center_freq = bin_frequency(bin);
    let kernel_length = ((q_factor * AUDIO_SAMPLE_RATE as f64 / center_freq).round() as usize)
        .clamp(1, CQT_WINDOW_LENGTH);

    let mut buffer = vec![Complex::new(0.0f32, 0.0); CQT_WINDOW_LENGTH];
    let offset = (CQT_WINDOW_LENGTH - kernel_length) / 2;
    for n in 0..kernel_length {
        let phase =
            2.0 * std::f64::consts::PI * center_freq * n as f64 / AUDIO_SAMPLE_RATE as f64;
        let window = hann(n, kernel_length);
        let scaled = window / kernel_length as f64;
        buffer[offset + n] = Complex::new(
            (scaled * phase.cos()) as f32,
            (scaled * phase.sin()) as f32,
        );
    }
    fft.process(&mut buffer);

    // Keep the contiguous span above the sparsity threshold
    let peak = buffer.iter().map(|c| c.norm()).fold(0.0f32, f32::max);
    let threshold = peak * SPARSITY_THRESHOLD;
    let start = buffer
        .iter()
        .position(|c| c.norm() >= threshold)
        .unwrap_or(0);
    let end = buffer
        .iter()
        .rposition(|c| c.norm() >= threshold)
        .map(|i| i + 1)
        .unwrap_or(buffer.len());

    SpectralKernel {
        start,
        coeffs: buffer[start..end].to_vec(),
    }
}

fn hann(n: usize, length: usize) -> f64 {
    if length < 2 {
        return 1.0;
    }
    let x = std::f64::consts::PI * n as f64 / (length - 1) as f64;
    0.5 - 0.5 * (2.0 * x).cos()
}
