mod penguin;
mod sentiment;

pub use penguin::PenguinClassifier;
pub use sentiment::SentimentAnalyzer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::metrics::{INFERENCE_FAILURES, INFERENCE_LATENCY, INFERENCE_TIMEOUTS};

// A single named model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

pub type Features = BTreeMap<String, FeatureValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
    // per-class probabilities, in the model's class order
    pub probabilities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("{context}: {message}")]
    Failure { context: String, message: String },
}

impl InferenceError {
    pub fn failure(context: impl Into<String>, message: impl Into<String>) -> Self {
        InferenceError::Failure {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// A model behind the gateway. Implementations are CPU-bound and synchronous;
/// [`run_prediction`] moves them off the async workers.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, features: &Features) -> Result<Prediction, InferenceError>;
}

pub(crate) fn number(features: &Features, name: &str) -> Result<f64, InferenceError> {
    match features.get(name) {
        Some(FeatureValue::Number(n)) => Ok(*n),
        Some(FeatureValue::Text(_)) => Err(InferenceError::failure(
            "Invalid feature",
            format!("'{}' must be numeric", name),
        )),
        None => Err(InferenceError::failure(
            "Missing feature",
            format!("'{}' was not provided", name),
        )),
    }
}

pub(crate) fn text<'a>(features: &'a Features, name: &str) -> Result<&'a str, InferenceError> {
    match features.get(name) {
        Some(FeatureValue::Text(t)) => Ok(t),
        Some(FeatureValue::Number(_)) => Err(InferenceError::failure(
            "Invalid feature",
            format!("'{}' must be text", name),
        )),
        None => Err(InferenceError::failure(
            "Missing feature",
            format!("'{}' was not provided", name),
        )),
    }
}

/// Runs the model on the blocking pool, bounded by `limit`. On timeout the
/// blocking call still runs to completion; its result is discarded.
pub async fn run_prediction(
    model: Arc<dyn Predictor>,
    features: Features,
    limit: Duration,
) -> Result<Prediction, InferenceError> {
    let start = Instant::now();
    let name = model.name().to_string();
    let task = tokio::task::spawn_blocking(move || model.predict(&features));

    let result = match timeout(limit, task).await {
        Err(_) => {
            INFERENCE_TIMEOUTS.inc();
            warn!(model = %name, ?limit, "Inference timed out");
            return Err(InferenceError::Timeout(limit));
        }
        Ok(Err(join_err)) => Err(InferenceError::failure(
            "Error during model inference",
            join_err.to_string(),
        )),
        Ok(Ok(result)) => result,
    };

    INFERENCE_LATENCY.observe(start.elapsed().as_secs_f64());
    match &result {
        Ok(prediction) => debug!(model = %name, label = %prediction.label, "Inference done"),
        Err(e) => {
            INFERENCE_FAILURES.inc();
            warn!(model = %name, error = %e, "Inference failed");
        }
    }
    result
}
