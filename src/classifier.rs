use std::io;

use ndarray::{Array1, Array2, Array4, Axis};

use crate::constants::{N_CQT_BINS, WINDOW_FRAMES};
use crate::error::EstimatorError;
use crate::inference::{OrtPredictor, Predictor};
use crate::models::{resolve_model_name, to_model_resource, DirectoryStore, ResourceStore};
use crate::postprocessing::key::Key;

/// Normalizes every window of a batch to zero mean and unit variance.
///
/// Statistics are computed per window over all of its values, in f64 to
/// avoid numerical trouble with very large or very small magnitudes. A
/// window with zero variance is only mean-centered, never scaled.
///
/// # Arguments
///
/// * `batch` - Window batch of shape `(windows, bins, frames, 1)`.
///
/// # Returns
///
/// * The standardized batch, same shape.
pub fn std_normalize(batch: &Array4<f32>) -> Array4<f32> {
    let mut normalized = batch.to_owned();

    for mut window in normalized.axis_iter_mut(Axis(0)) {
        let count = window.len() as f64;
        let mean = window.iter().map(|&value| value as f64).sum::<f64>() / count;
        let variance = window
            .iter()
            .map(|&value| {
                let deviation = value as f64 - mean;
                deviation * deviation
            })
            .sum::<f64>()
            / count;
        let std_dev = variance.sqrt();

        if std_dev != 0.0 {
            window.mapv_inplace(|value| ((value as f64 - mean) / std_dev) as f32);
        } else {
            window.mapv_inplace(|value| (value as f64 - mean) as f32);
        }
    }

    normalized
}

/// Location of the first maximum, ties broken towards the lowest index.
fn arg_max(values: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Element-wise mean over the window axis, accumulated in f64.
fn average_distribution(prediction: &Array2<f32>) -> Array1<f64> {
    let n_windows = prediction.shape()[0] as f64;
    let mut averaged = Array1::<f64>::zeros(prediction.shape()[1]);
    for row in prediction.outer_iter() {
        for (slot, &value) in averaged.iter_mut().zip(row.iter()) {
            *slot += value as f64;
        }
    }
    averaged.mapv_inplace(|value| value / n_windows);
    averaged
}

/// Classifier that estimates the musical key of constant-Q feature windows
/// with a pretrained model.
///
/// A classifier resolves its model name once at construction, loads the
/// model, and owns the resulting predictor for its lifetime.
pub struct KeyClassifier<P = OrtPredictor> {
    model_name: String,
    predictor: P,
}

impl KeyClassifier<OrtPredictor> {
    /// Creates a classifier for a model name or alias, e.g. `deepspec`,
    /// `shallowspec` or `deepsquare`, loading the model resource from the
    /// default directory store.
    pub fn new(model_name: &str) -> Result<Self, EstimatorError> {
        Self::with_store(model_name, &DirectoryStore::default())
    }

    /// Creates a classifier whose model resource comes from `store`.
    ///
    /// Fails without constructing a partial classifier when the name cannot
    /// be resolved to readable resource bytes or the model does not load.
    pub fn with_store(
        model_name: &str,
        store: &dyn ResourceStore,
    ) -> Result<Self, EstimatorError> {
        let resolved = resolve_model_name(model_name);
        let locator = to_model_resource(resolved);
        log::debug!("resolved model '{model_name}' to resource '{locator}'");

        let bytes = store.fetch(&locator).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                // Name the model the caller asked for, not the physical id
                EstimatorError::ModelNotFound {
                    name: model_name.to_string(),
                    source,
                }
            } else {
                EstimatorError::Resource {
                    locator: locator.clone(),
                    source,
                }
            }
        })?;

        let predictor = OrtPredictor::from_bytes(&bytes)?;
        Ok(KeyClassifier {
            model_name: resolved.to_string(),
            predictor,
        })
    }
}

impl<P: Predictor> KeyClassifier<P> {
    /// Creates a classifier around an already loaded predictor. This is the
    /// seam for alternative inference engines and for tests.
    pub fn with_predictor(model_name: &str, predictor: P) -> Self {
        KeyClassifier {
            model_name: resolve_model_name(model_name).to_string(),
            predictor,
        }
    }

    /// The resolved (physical) model name this classifier runs.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Estimates a key probability distribution for every window.
    ///
    /// # Arguments
    ///
    /// * `data` - Feature batch of shape `(windows, 168, 60, 1)`.
    ///
    /// # Returns
    ///
    /// * One 24-class distribution per window, in window order.
    pub fn estimate(&self, data: &Array4<f32>) -> Result<Array2<f32>, EstimatorError> {
        let shape = data.shape();
        if shape[1] != N_CQT_BINS || shape[2] != WINDOW_FRAMES || shape[3] != 1 {
            return Err(EstimatorError::ShapeMismatch {
                actual: shape.to_vec(),
            });
        }
        if shape[0] == 0 {
            return Err(EstimatorError::InvalidInput(
                "window batch contains no windows".to_string(),
            ));
        }

        let normalized = std_normalize(data);
        self.predictor.predict(&normalized)
    }

    /// Estimates the predominant global key of a whole feature batch.
    ///
    /// Per-window distributions are averaged element-wise (weighting each
    /// window's full distribution rather than voting on per-window winners),
    /// and the arg-max of the mean names the key; ties fall to the lowest
    /// class index.
    pub fn estimate_key(&self, data: &Array4<f32>) -> Result<Key, EstimatorError> {
        let prediction = self.estimate(data)?;
        let averaged = average_distribution(&prediction);
        let index = arg_max(&averaged).ok_or_else(|| {
            EstimatorError::InvalidInput("empty key distribution".to_string())
        })?;

        let key = Key::from_class_index(index)?;
        log::debug!("estimated key {key} from {} windows", prediction.shape()[0]);
        Ok(key)
    }
}
