//! Musical key estimation from audio recordings.
//!
//! The pipeline resamples an audio file to 22 050 Hz, computes a constant-Q
//! spectrogram (E1 + 7 octaves, two bins per semitone), cuts it into
//! overlapping 60-frame windows, standardizes each window and feeds the
//! batch to a pretrained convolutional classifier. The per-window key
//! distributions are averaged and the arg-max names the key.
//!
//! ```no_run
//! use keyscope::{read_default_features, KeyClassifier};
//!
//! let features = read_default_features("song.wav")?;
//! let classifier = KeyClassifier::new("deepspec")?;
//! let key = classifier.estimate_key(&features)?;
//! println!("{key}");
//! # Ok::<(), keyscope::EstimatorError>(())
//! ```

pub mod classifier;
pub mod constants;
pub mod error;
pub mod inference;
pub mod models;
pub mod preprocessing {
    pub mod cqt;
    pub mod feature;
    pub mod load_audio;
}
pub mod postprocessing {
    pub mod key;
}

pub use classifier::{std_normalize, KeyClassifier};
pub use error::EstimatorError;
pub use inference::{OrtPredictor, Predictor};
pub use models::{DirectoryStore, ResourceStore};
pub use postprocessing::key::{Key, Mode, PITCH_CLASS_NAMES};
pub use preprocessing::feature::{read_default_features, read_features};
pub use preprocessing::load_audio::load_audio;
