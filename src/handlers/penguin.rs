use axum::{Json, extract::State, extract::rejection::JsonRejection};
use std::sync::Arc;
use crate::error::ApiError;
use crate::inference::run_prediction;
use crate::models::{PenguinV1, PenguinV2, PredictionResponse};
use crate::state::AppState;

async fn classify(state: &AppState, penguin: PenguinV1) -> Result<Json<PredictionResponse>, ApiError> {
    let prediction = run_prediction(
        Arc::clone(&state.penguin),
        penguin.features(),
        state.inference_timeout,
    )
    .await?;

    Ok(Json(PredictionResponse {
        predicted_species: vec![prediction.label],
        confidence: vec![prediction.probabilities],
    }))
}

pub async fn classify_penguin_v1(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PenguinV1>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(penguin) = payload?;
    penguin.validate()?;
    classify(&state, penguin).await
}

// v2 takes the four measurements as one space-separated string
pub async fn classify_penguin_v2(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PenguinV2>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(penguin) = payload?;
    classify(&state, PenguinV1::try_from(penguin)?).await
}
