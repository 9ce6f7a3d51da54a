use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::metrics::{AUTH_REJECTED, RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL, TRACKED_KEYS};
use crate::state::AppState;

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Verify the API key, then spend one slot of its quota. Runs before body
/// extraction so rejected callers never reach a model.
pub async fn admission(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let credential = match state.gate.verify_headers(request.headers()) {
        Ok(credential) => credential,
        Err(e) => {
            let reason = match e {
                AuthError::MissingCredential => "missing",
                AuthError::InvalidCredential => "invalid",
            };
            AUTH_REJECTED.with_label_values(&[reason]).inc();
            warn!(path = %request.uri().path(), reason, "Rejected request");
            return ApiError::from(e).into_response();
        }
    };

    let remaining = match state.limiter.admit(&credential, Instant::now()) {
        Ok(remaining) => remaining,
        Err(e) => {
            RATE_LIMITED.inc();
            info!(key = %credential.fingerprint(), "Rate limit exceeded");
            return ApiError::from(e).into_response();
        }
    };
    TRACKED_KEYS.set(state.limiter.tracked_keys() as f64);
    debug!(key = %credential.fingerprint(), remaining, "Admitted request");

    request.extensions_mut().insert(credential);
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(state.limiter.limit()));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
    response
}

// Log request processing time
pub async fn log_process_time(request: Request, next: Next) -> Response {
    REQUEST_TOTAL.inc();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    REQUEST_LATENCY.observe(elapsed.as_secs_f64());
    info!(
        "Request: {} {} -> {} completed in {:.6} seconds",
        method,
        uri,
        response.status().as_u16(),
        elapsed.as_secs_f64()
    );
    response
}
