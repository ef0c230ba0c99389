use std::fmt;

use crate::constants::N_KEY_CLASSES;
use crate::error::EstimatorError;

/// Chromatic pitch-class names starting at C, sharps for the accidentals.
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Major or minor tonality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
        }
    }
}

/// A musical key: tonic pitch class plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub tonic: &'static str,
    pub mode: Mode,
}

impl Key {
    /// Maps a model class index to a key.
    ///
    /// Indices 0-11 are the major keys C..B, indices 12-23 the minor keys
    /// C..B, both in chromatic order. The index is first converted to a
    /// MIDI-relative offset (`index + 12` for major, `index - 12` for
    /// minor), whose pitch class names the tonic.
    ///
    /// # Arguments
    ///
    /// * `index` - Class index in `0..24`.
    ///
    /// # Returns
    ///
    /// * The corresponding key, or an error for indices outside `0..24`.
    pub fn from_class_index(index: usize) -> Result<Key, EstimatorError> {
        if index >= N_KEY_CLASSES {
            return Err(EstimatorError::InvalidInput(format!(
                "key class index must be below {N_KEY_CLASSES}, got {index}"
            )));
        }

        let minor = index >= 12;
        let midi = if minor { index - 12 } else { index + 12 };
        Ok(Key {
            tonic: PITCH_CLASS_NAMES[midi % 12],
            mode: if minor { Mode::Minor } else { Mode::Major },
        })
    }

    /// Maps a sequence of class indices, preserving order.
    pub fn from_class_indices(indices: &[usize]) -> Result<Vec<Key>, EstimatorError> {
        indices.iter().map(|&i| Key::from_class_index(i)).collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}
