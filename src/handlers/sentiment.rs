use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use std::sync::Arc;
use tracing::warn;
use crate::auth::Credential;
use crate::error::ApiError;
use crate::inference::run_prediction;
use crate::models::{
    BatchAccepted, BatchJob, CommentRequest, CommentResponse, Reviews, text_features,
};
use crate::state::AppState;

pub async fn analyze_review(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, ApiError> {
    let Json(review) = payload?;
    review.validate()?;

    let prediction = run_prediction(
        Arc::clone(&state.sentiment),
        text_features(&review.text),
        state.inference_timeout,
    )
    .await?;

    Ok(Json(CommentResponse {
        text: review.text,
        sentiment: prediction.label,
        confidence: prediction.confidence,
        status: "success".to_string(),
    }))
}

// Hand the texts to the background worker and answer right away
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<Credential>,
    payload: Result<Json<Reviews>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchAccepted>), ApiError> {
    let Json(reviews) = payload?;
    reviews.validate()?;

    let queued = reviews.texts.len();
    let job = BatchJob {
        texts: reviews.texts,
        requested_by: credential.fingerprint(),
    };

    state.batch_tx.try_send(job).map_err(|e| {
        warn!("Failed to queue batch: {}", e);
        ApiError::QueueFull
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(BatchAccepted {
            message: "Processing started".to_string(),
            queued,
        }),
    ))
}
