use std::io;

use thiserror::Error;

use crate::constants::{N_CQT_BINS, WINDOW_FRAMES};

/// Errors surfaced by the key estimation pipeline.
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// A window batch did not have the dimensions the model expects.
    #[error(
        "input batch must have shape (windows, {N_CQT_BINS}, {WINDOW_FRAMES}, 1), actual shape was {actual:?}"
    )]
    ShapeMismatch {
        /// The shape that was actually passed in.
        actual: Vec<usize>,
    },

    /// No model resource exists for the requested name. Carries the name the
    /// caller asked for, not the resolved physical id.
    #[error("failed to find a model named '{name}', please check the model name")]
    ModelNotFound {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A model resource was located but its bytes could not be read.
    #[error("failed to read model resource '{locator}'")]
    Resource {
        locator: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode audio file")]
    Decode(#[from] hound::Error),

    #[error("failed to construct resampler")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),

    #[error("failed to resample audio")]
    Resample(#[from] rubato::ResampleError),

    #[error("inference failed")]
    Inference(#[from] ort::Error),

    /// The inference engine returned something other than one probability
    /// distribution per window.
    #[error("model output invalid: {0}")]
    ModelOutput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
