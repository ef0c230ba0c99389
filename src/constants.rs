// Audio / CQT
pub const AUDIO_SAMPLE_RATE: usize = 22050;
pub const OCTAVES: usize = 7;
pub const BINS_PER_SEMITONE: usize = 2;
pub const BINS_PER_OCTAVE: usize = 12 * BINS_PER_SEMITONE;
pub const N_CQT_BINS: usize = BINS_PER_OCTAVE * OCTAVES;
pub const CQT_WINDOW_LENGTH: usize = 8192;
pub const CQT_HOP_LENGTH: usize = CQT_WINDOW_LENGTH / 2;
// E1, the lowest analyzed pitch
pub const FMIN_MIDI: usize = 28;

// Feature windows
pub const WINDOW_FRAMES: usize = 60;
pub const WINDOW_HOP: usize = 30;

// Classification
pub const N_KEY_CLASSES: usize = 24;

// Model resources
pub const MODEL_NAMESPACE: &str = "models/";
pub const MODEL_EXTENSION: &str = ".onnx";
pub const DEFAULT_MODEL: &str = "deepspec";
