use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::auth::CredentialGate;
use crate::config::Args;
use crate::handlers::{
    analyze_batch, analyze_review, classify_penguin_v1, classify_penguin_v2, health_handler,
    metrics_handler,
};
use crate::inference::Predictor;
use crate::middleware::{admission, log_process_time};
use crate::models::BatchJob;
use crate::rate_limit::{AdmissionController, sweeper};
use crate::state::AppState;
use crate::worker::batch_worker;

/// Composition root: builds the shared state and starts the background tasks
/// (batch worker, window sweeper) it depends on. Must run inside a tokio runtime.
pub fn build_state(
    args: &Args,
    sentiment: Arc<dyn Predictor>,
    penguin: Arc<dyn Predictor>,
) -> Arc<AppState> {
    let (batch_tx, batch_rx) = mpsc::channel::<BatchJob>(args.batch_queue);
    let limiter = Arc::new(AdmissionController::new(args.rate_limit, args.rate_window()));

    tokio::spawn(batch_worker(batch_rx, Arc::clone(&sentiment), args.inference_timeout()));

    match args.sweep_interval() {
        Some(every) => {
            tokio::spawn(sweeper(Arc::clone(&limiter), every));
        }
        None => info!("Window sweeper disabled"),
    }

    Arc::new(AppState {
        gate: CredentialGate::new(args.api_key_header.clone(), args.api_key.clone()),
        limiter,
        sentiment,
        penguin,
        inference_timeout: args.inference_timeout(),
        batch_tx,
    })
}

// Model routes sit behind the admission check, health and metrics don't
pub fn router(state: Arc<AppState>) -> Router {
    let models = Router::new()
        .route("/v1/sentiment", post(analyze_review))
        .route("/v1/sentiment/batch", post(analyze_batch))
        .route("/v1/penguin_classifier", post(classify_penguin_v1))
        .route("/v2/penguin_classifier", post(classify_penguin_v2))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), admission));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(models)
        .layer(middleware::from_fn(log_process_time))
        .with_state(state)
}
