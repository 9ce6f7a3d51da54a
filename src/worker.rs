use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use crate::inference::{Prediction, Predictor, run_prediction};
use crate::metrics::BATCH_ITEMS;
use crate::models::{BatchJob, text_features};


pub async fn batch_worker(
    mut rx: mpsc::Receiver<BatchJob>,
    model: Arc<dyn Predictor>,
    inference_timeout: Duration,
) {
    info!("Batch worker started - processing reviews sequentially");

    // keep receiving jobs from the queue until every sender is gone
    while let Some(job) = rx.recv().await {
        info!(key = %job.requested_by, items = job.texts.len(), "[Worker] Batch received");
        process_batch(&job, &model, inference_timeout).await;
    }

    info!("Batch worker stopped");
}

// One text failing doesn't stop the rest of the batch
pub async fn process_batch(
    job: &BatchJob,
    model: &Arc<dyn Predictor>,
    inference_timeout: Duration,
) -> Vec<Option<Prediction>> {
    let mut results = Vec::with_capacity(job.texts.len());

    for (i, text) in job.texts.iter().enumerate() {
        let outcome = run_prediction(Arc::clone(model), text_features(text), inference_timeout).await;
        BATCH_ITEMS.inc();
        match outcome {
            Ok(prediction) => {
                info!(index = i, label = %prediction.label, confidence = prediction.confidence, "[Worker] Processed");
                results.push(Some(prediction));
            }
            Err(e) => {
                warn!(index = i, error = %e, "[Worker] Item failed");
                results.push(None);
            }
        }
    }
    results
}
