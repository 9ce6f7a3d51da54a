use clap::Parser; // for cli
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ml_gateway::app::{build_state, router};
use ml_gateway::config::Args;
use ml_gateway::inference::{PenguinClassifier, Predictor, SentimentAnalyzer};

// this is main async function with tokio
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    if let Err(e) = args.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    let sentiment: Arc<dyn Predictor> = Arc::new(SentimentAnalyzer::new());
    let penguin: Arc<dyn Predictor> = Arc::new(PenguinClassifier::new());
    let state = build_state(&args, sentiment, penguin);
    info!("Models loaded: {}, {}", state.sentiment.name(), state.penguin.name());
    info!("API key header: {}", state.gate.header_name());

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Gateway running on http://localhost:{}", args.port);
    info!(
        "Rate limit: {} requests per {} seconds per key",
        args.rate_limit, args.rate_window
    );
    info!("Inference timeout: {} ms", args.inference_timeout_ms);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
    info!("Closing ML API...");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
