use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, IntCounterVec, TextEncoder, register_counter,
    register_gauge, register_histogram, register_int_counter_vec,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("ml_gateway_requests_total", "Total number of requests").unwrap();
    pub static ref AUTH_REJECTED: IntCounterVec = register_int_counter_vec!(
        "ml_gateway_auth_rejected_total",
        "Requests rejected by the credential check",
        &["reason"]
    )
    .unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("ml_gateway_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref INFERENCE_TIMEOUTS: Counter =
        register_counter!("ml_gateway_inference_timeouts_total", "Model calls that hit the timeout").unwrap();
    pub static ref INFERENCE_FAILURES: Counter =
        register_counter!("ml_gateway_inference_failures_total", "Model calls that returned an error").unwrap();
    pub static ref BATCH_ITEMS: Counter =
        register_counter!("ml_gateway_batch_items_total", "Texts processed by the batch worker").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "ml_gateway_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref INFERENCE_LATENCY: Histogram = register_histogram!(
        "ml_gateway_inference_latency_seconds",
        "Model call latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_KEYS: Gauge =
        register_gauge!("ml_gateway_tracked_keys", "Keys currently holding a rate limit window").unwrap();
}

// Render the default registry in the text exposition format
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Metrics encode error: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics utf8 error: {}", e))
}
