mod health;
mod metrics;
mod penguin;
mod sentiment;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use penguin::{classify_penguin_v1, classify_penguin_v2};
pub use sentiment::{analyze_batch, analyze_review};
