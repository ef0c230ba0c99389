use std::cell::RefCell;
use std::io::Write;

use ndarray::{Array2, Array4, Ix2};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use crate::constants::N_KEY_CLASSES;
use crate::error::EstimatorError;

/// A loaded classification model: one probability distribution per window.
///
/// The pretrained network is opaque to the rest of the pipeline; anything
/// able to turn a `(windows, 168, 60, 1)` batch into a `(windows, 24)`
/// distribution matrix can stand in for it.
pub trait Predictor {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, EstimatorError>;
}

/// ONNX Runtime backed predictor.
pub struct OrtPredictor {
    session: RefCell<Session>,
}

impl OrtPredictor {
    /// Loads a model from raw resource bytes.
    ///
    /// ONNX Runtime is handed a file path, so the bytes pass through a
    /// named temporary file that is removed when this function returns,
    /// whether loading succeeded or not.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EstimatorError> {
        log::debug!("loading ONNX model ({} bytes)", bytes.len());

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::from)?
            .with_intra_threads(4)
            .map_err(ort::Error::from)?
            .commit_from_file(file.path())?;

        Ok(OrtPredictor {
            session: RefCell::new(session),
        })
    }
}

impl Predictor for OrtPredictor {
    fn predict(&self, batch: &Array4<f32>) -> Result<Array2<f32>, EstimatorError> {
        let n_windows = batch.shape()[0];

        let input_shape: Vec<i64> = batch.shape().iter().map(|&dim| dim as i64).collect();
        let input_data: Vec<f32> = batch.iter().copied().collect();
        let input_tensor = Tensor::from_array((input_shape, input_data))?;

        let mut session = self.session.borrow_mut();
        let outputs = session.run(ort::inputs![input_tensor])?;
        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| EstimatorError::ModelOutput("model produced no output".to_string()))?;

        let distributions = value
            .try_extract_array::<f32>()?
            .to_owned()
            .into_dimensionality::<Ix2>()
            .map_err(|e| EstimatorError::ModelOutput(e.to_string()))?;

        let (rows, classes) = distributions.dim();
        if rows != n_windows || classes != N_KEY_CLASSES {
            return Err(EstimatorError::ModelOutput(format!(
                "expected a ({n_windows}, {N_KEY_CLASSES}) distribution matrix, got ({rows}, {classes})"
            )));
        }

        Ok(distributions)
    }
}
