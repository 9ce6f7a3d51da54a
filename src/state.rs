use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use crate::auth::CredentialGate;
use crate::inference::Predictor;
use crate::models::BatchJob;
use crate::rate_limit::AdmissionController;
// app's shared state

pub struct AppState {
    pub gate: CredentialGate,
    pub limiter: Arc<AdmissionController>,
    pub sentiment: Arc<dyn Predictor>,
    pub penguin: Arc<dyn Predictor>,
    pub inference_timeout: Duration, // upper bound on one model call
    pub batch_tx: mpsc::Sender<BatchJob>,
}
