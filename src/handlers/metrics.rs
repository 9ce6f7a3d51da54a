use axum::{http::StatusCode, response::IntoResponse};
use tracing::error;
use crate::metrics::render;

pub async fn metrics_handler() -> impl IntoResponse {
    match render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("{}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}
