use std::sync::Arc;
use std::time::Duration;

use ml_gateway::app::{build_state, router};
use ml_gateway::config::Args;
use ml_gateway::inference::{
    Features, InferenceError, PenguinClassifier, Prediction, Predictor, SentimentAnalyzer,
};
use serde_json::{Value, json};

const KEY: &str = "your_secret_key";

fn args(rate_limit: u32) -> Args {
    Args {
        port: 0,
        api_key: KEY.to_string(),
        api_key_header: "X-API-Key".to_string(),
        rate_limit,
        rate_window: 60,
        inference_timeout_ms: 200,
        batch_queue: 8,
        sweep_interval: 0,
    }
}

struct SlowModel;

impl Predictor for SlowModel {
    fn name(&self) -> &str {
        "slow"
    }

    fn predict(&self, _features: &Features) -> Result<Prediction, InferenceError> {
        std::thread::sleep(Duration::from_millis(600));
        Ok(Prediction {
            label: "late".into(),
            confidence: 1.0,
            probabilities: vec![1.0],
        })
    }
}

struct BrokenModel;

impl Predictor for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    fn predict(&self, _features: &Features) -> Result<Prediction, InferenceError> {
        Err(InferenceError::failure("Prediction error", "weights not loaded"))
    }
}

// Start the gateway on an ephemeral port, return its base url
async fn spawn_gateway(args: Args, sentiment: Arc<dyn Predictor>) -> String {
    let penguin: Arc<dyn Predictor> = Arc::new(PenguinClassifier::new());
    let app = router(build_state(&args, sentiment, penguin));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn default_gateway(rate_limit: u32) -> String {
    spawn_gateway(args(rate_limit), Arc::new(SentimentAnalyzer::new())).await
}

async fn post(base: &str, path: &str, key: Option<&str>, body: Value) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut req = client.post(format!("{}{}", base, path)).json(&body);
    if let Some(key) = key {
        req = req.header("X-API-Key", key);
    }
    req.send().await.unwrap()
}

async fn code_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_open() {
    let base = default_gateway(3).await;
    let res = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models"], json!(["sentiment", "penguin_classifier"]));
}

#[tokio::test]
async fn missing_and_wrong_keys_are_distinguished() {
    let base = default_gateway(3).await;
    let body = json!({"text": "This is not a good product"});

    let res = post(&base, "/v1/sentiment", None, body.clone()).await;
    assert_eq!(res.status(), 401);
    assert_eq!(code_of(res).await, "MISSING_CREDENTIAL");

    let res = post(&base, "/v1/sentiment", Some("invalid_key"), body).await;
    assert_eq!(res.status(), 403);
    assert_eq!(code_of(res).await, "INVALID_CREDENTIAL");
}

#[tokio::test]
async fn sentiment_prediction_with_quota_headers() {
    let base = default_gateway(3).await;
    let res = post(&base, "/v1/sentiment", Some(KEY), json!({"text": "I love this product, it's fantastic!"})).await;

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-ratelimit-limit"], "3");
    assert_eq!(res.headers()["x-ratelimit-remaining"], "2");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["sentiment"], "Positive");
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn quota_exhaustion_returns_429() {
    let base = default_gateway(3).await;
    let body = json!({"text": "Really satisfied with the quality!"});

    for expected in ["2", "1", "0"] {
        let res = post(&base, "/v1/sentiment", Some(KEY), body.clone()).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["x-ratelimit-remaining"], expected);
    }

    let res = post(&base, "/v1/sentiment", Some(KEY), body).await;
    assert_eq!(res.status(), 429);
    assert!(res.headers().contains_key("retry-after"));
    assert_eq!(code_of(res).await, "RATE_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn auth_failures_do_not_spend_quota() {
    let base = default_gateway(1).await;
    let body = json!({"text": "fine"});

    for _ in 0..3 {
        let res = post(&base, "/v1/sentiment", Some("invalid_key"), body.clone()).await;
        assert_eq!(res.status(), 403);
    }
    let res = post(&base, "/v1/sentiment", Some(KEY), body).await;
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn quota_is_checked_before_body_validation() {
    let base = default_gateway(1).await;
    let res = post(&base, "/v1/sentiment", Some(KEY), json!({"text": "   "})).await;
    assert_eq!(res.status(), 400);
    assert_eq!(code_of(res).await, "VALIDATION_ERROR");

    // the slot was spent at admission
    let res = post(&base, "/v1/sentiment", Some(KEY), json!({"text": "ok"})).await;
    assert_eq!(res.status(), 429);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let base = default_gateway(5).await;
    let res = post(&base, "/v1/penguin_classifier", Some(KEY), json!({"bill_length_mm": "long"})).await;
    assert_eq!(res.status(), 400);
    assert_eq!(code_of(res).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn slow_model_times_out_with_408() {
    let base = spawn_gateway(args(5), Arc::new(SlowModel)).await;
    let res = post(&base, "/v1/sentiment", Some(KEY), json!({"text": "This is a test"})).await;
    assert_eq!(res.status(), 408);
    assert_eq!(code_of(res).await, "INFERENCE_TIMEOUT");
}

#[tokio::test]
async fn failing_model_returns_500() {
    let base = spawn_gateway(args(5), Arc::new(BrokenModel)).await;
    let res = post(&base, "/v1/sentiment", Some(KEY), json!({"text": "This is a test"})).await;
    assert_eq!(res.status(), 500);
    assert_eq!(code_of(res).await, "INFERENCE_FAILURE");
}

#[tokio::test]
async fn penguin_versions_agree() {
    let base = default_gateway(5).await;
    let v1 = post(
        &base,
        "/v1/penguin_classifier",
        Some(KEY),
        json!({"bill_length_mm": 39.1, "bill_depth_mm": 18.7, "flipper_length_mm": 181, "body_mass_g": 3750}),
    )
    .await;
    assert_eq!(v1.status(), 200);
    let v1: Value = v1.json().await.unwrap();

    let v2 = post(&base, "/v2/penguin_classifier", Some(KEY), json!({"data": "39.1 18.7 181 3750"})).await;
    assert_eq!(v2.status(), 200);
    let v2: Value = v2.json().await.unwrap();

    assert_eq!(v1["predicted_species"], json!(["Adelie"]));
    assert_eq!(v1, v2);
    assert_eq!(v1["confidence"][0].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn penguin_overflow_is_a_failure_not_a_nan_payload() {
    let base = default_gateway(5).await;
    let res = post(
        &base,
        "/v1/penguin_classifier",
        Some(KEY),
        json!({"bill_length_mm": 1e200, "bill_depth_mm": 18.7, "flipper_length_mm": 181, "body_mass_g": 3750}),
    )
    .await;
    assert_eq!(res.status(), 500);
    assert_eq!(code_of(res).await, "INFERENCE_FAILURE");
}

#[tokio::test]
async fn penguin_v2_rejects_wrong_arity() {
    let base = default_gateway(5).await;
    let res = post(&base, "/v2/penguin_classifier", Some(KEY), json!({"data": "39.1 18.7 181"})).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn batch_is_accepted_for_background_processing() {
    let base = default_gateway(5).await;
    let res = post(
        &base,
        "/v1/sentiment/batch",
        Some(KEY),
        json!({"texts": ["I love this product", "I did not like it", "It is acceptable"]}),
    )
    .await;
    assert_eq!(res.status(), 202);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Processing started");
    assert_eq!(body["queued"], 3);

    let res = post(&base, "/v1/sentiment/batch", Some(KEY), json!({"texts": []})).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn metrics_are_exposed() {
    let base = default_gateway(5).await;
    let _ = post(&base, "/v1/sentiment", None, json!({"text": "x"})).await;
    let text = reqwest::get(format!("{}/metrics", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains("ml_gateway_auth_rejected_total"));
}
