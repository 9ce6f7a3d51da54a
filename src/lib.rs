//! Authenticated, per-key rate-limited HTTP front door for small ML models.
//!
//! Requests carry an API key in a header. [`auth::CredentialGate`] checks it
//! against the configured secret, [`rate_limit::AdmissionController`] spends
//! one slot of that key's sliding one-minute window, and only then does the
//! handler run the model, off the async workers and under a timeout.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod worker;
