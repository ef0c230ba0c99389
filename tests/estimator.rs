//! End-to-end tests for the feature -> classification pipeline, run against
//! a stub predictor so no model resources are required.

use ndarray::{Array2, Array4};

use keyscope::constants::{
    AUDIO_SAMPLE_RATE, CQT_HOP_LENGTH, N_CQT_BINS, N_KEY_CLASSES, WINDOW_FRAMES,
};
use keyscope::{
    read_features, DirectoryStore, EstimatorError, Key, KeyClassifier, Mode, Predictor,
    PITCH_CLASS_NAMES,
};

/// Predictor that plays back canned per-window distributions.
struct StubModel {
    rows: Vec<Vec<f32>>,
}

impl Predictor for StubModel {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, EstimatorError> {
        assert_eq!(batch.shape()[0], self.rows.len());
        let flat: Vec<f32> = self.rows.iter().flatten().copied().collect();
        Ok(Array2::from_shape_vec((self.rows.len(), N_KEY_CLASSES), flat).unwrap())
    }
}

fn one_hot(index: usize) -> Vec<f32> {
    let mut row = vec![0.0; N_KEY_CLASSES];
    row[index] = 1.0;
    row
}

/// The synthetic two-window fixture: periodic activation every 4 frames in
/// window 0 and every 30 frames in window 1.
fn synthetic_batch() -> Array4<f32> {
    let mut data = Array4::zeros((2, N_CQT_BINS, WINDOW_FRAMES, 1));
    for t in (0..WINDOW_FRAMES).step_by(4) {
        for bin in 0..N_CQT_BINS {
            data[[0, bin, t, 0]] = 1.0;
        }
    }
    for t in (0..WINDOW_FRAMES).step_by(30) {
        for bin in 0..N_CQT_BINS {
            data[[1, bin, t, 0]] = 1.0;
        }
    }
    data
}

/// Writes a mono 16-bit WAV containing a 220 Hz sine.
fn write_sine_wav(path: &std::path::Path, sample_rate: u32, n_samples: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..n_samples {
        let phase = 2.0 * std::f64::consts::PI * 220.0 * n as f64 / sample_rate as f64;
        writer
            .write_sample((phase.sin() * 0.5 * i16::MAX as f64) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn estimate_returns_one_distribution_per_window() {
    let rows = vec![
        vec![1.0 / N_KEY_CLASSES as f32; N_KEY_CLASSES],
        one_hot(7),
    ];
    let classifier = KeyClassifier::with_predictor("deepspec", StubModel { rows });

    let prediction = classifier.estimate(&synthetic_batch()).unwrap();
    assert_eq!(prediction.shape(), &[2, N_KEY_CLASSES]);

    for row in prediction.outer_iter() {
        assert!(row.iter().all(|&p| p >= 0.0));
        let sum: f32 = row.sum();
        assert!((sum - 1.0).abs() < 1e-5, "row sum {sum}");
    }
}

#[test]
fn synthetic_windows_average_to_d_major() {
    let classifier = KeyClassifier::with_predictor(
        "deepspec",
        StubModel {
            rows: vec![one_hot(5), one_hot(2)],
        },
    );

    let key = classifier.estimate_key(&synthetic_batch()).unwrap();
    assert_eq!(key, Key { tonic: "D", mode: Mode::Major });
}

#[test]
fn estimated_keys_are_well_formed() {
    for class in [0, 11, 12, 17, 23] {
        let classifier = KeyClassifier::with_predictor(
            "deepspec",
            StubModel {
                rows: vec![one_hot(class), one_hot(class)],
            },
        );
        let key = classifier.estimate_key(&synthetic_batch()).unwrap();
        assert!(PITCH_CLASS_NAMES.contains(&key.tonic));
        assert_eq!(key.mode == Mode::Minor, class >= 12);
    }
}

#[test]
fn shape_violation_does_not_corrupt_the_classifier() {
    let classifier = KeyClassifier::with_predictor(
        "deepspec",
        StubModel {
            rows: vec![one_hot(5), one_hot(2)],
        },
    );

    let bad = Array4::<f32>::zeros((2, N_CQT_BINS, WINDOW_FRAMES + 1, 1));
    let err = classifier.estimate(&bad).unwrap_err();
    assert!(matches!(err, EstimatorError::ShapeMismatch { .. }));
    let message = err.to_string();
    assert!(message.contains(&(WINDOW_FRAMES + 1).to_string()), "{message}");
    assert!(message.contains(&WINDOW_FRAMES.to_string()), "{message}");

    // The same instance still estimates valid batches afterwards
    assert!(classifier.estimate(&synthetic_batch()).is_ok());
}

#[test]
fn missing_model_error_names_the_requested_alias() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryStore::new(dir.path());

    let err = KeyClassifier::with_store("deepspec", &store).unwrap_err();
    match err {
        EstimatorError::ModelNotFound { ref name, .. } => assert_eq!(name, "deepspec"),
        other => panic!("expected ModelNotFound, got {other:?}"),
    }
    // The message carries the alias the caller used, not the physical id
    let message = err.to_string();
    assert!(message.contains("'deepspec'"), "{message}");
    assert!(!message.contains("deepspec_k16"), "{message}");
}

#[test]
fn short_recording_yields_exactly_one_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.wav");
    write_sine_wav(&path, AUDIO_SAMPLE_RATE as u32, 2 * AUDIO_SAMPLE_RATE);

    let features = read_features(&path, WINDOW_FRAMES, 30, false).unwrap();
    assert_eq!(features.shape(), &[1, N_CQT_BINS, WINDOW_FRAMES, 1]);
}

#[test]
fn edge_padding_adds_windows_at_both_ends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.wav");
    // 90 hops of audio -> 91 spectral frames -> 2 plain windows
    write_sine_wav(&path, AUDIO_SAMPLE_RATE as u32, 90 * CQT_HOP_LENGTH);

    let plain = read_features(&path, WINDOW_FRAMES, 30, false).unwrap();
    assert_eq!(plain.shape()[0], 2);

    // 60 extra zero frames -> 151 frames -> 4 windows
    let padded = read_features(&path, WINDOW_FRAMES, 30, true).unwrap();
    assert_eq!(padded.shape()[0], 4);
    assert_eq!(&padded.shape()[1..], &plain.shape()[1..]);
}

#[test]
fn higher_sample_rates_are_resampled_to_the_canonical_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cd_rate.wav");
    write_sine_wav(&path, 44_100, 4 * 44_100);

    // 4 s resamples to ~88 200 samples -> 22 spectral frames -> padded to one
    // full window
    let features = read_features(&path, WINDOW_FRAMES, 30, false).unwrap();
    assert_eq!(features.shape(), &[1, N_CQT_BINS, WINDOW_FRAMES, 1]);
}
