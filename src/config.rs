use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "ml-gateway")]
#[command(about = "Authenticated, rate-limited front door for small ML models")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Secret every caller must present
    #[arg(long, env = "API_KEY", default_value = "default_secret_key", hide_env_values = true)]
    pub api_key: String,

    // Header the secret is read from
    #[arg(long, env = "API_KEY_HEADER", default_value = "X-API-Key")]
    pub api_key_header: String,

    // Rate limit max requests per window, per key
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Upper bound on a single model call, in milliseconds
    #[arg(long, env = "INFERENCE_TIMEOUT_MS", default_value_t = 5000)]
    pub inference_timeout_ms: u64,

    // Capacity of the batch analysis queue
    #[arg(long, env = "BATCH_QUEUE", default_value_t = 100)]
    pub batch_queue: usize,

    // Idle window sweep interval in seconds (0 disables)
    #[arg(long, env = "SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("api key header name must not be empty")]
    EmptyHeader,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        if self.api_key_header.trim().is_empty() {
            return Err(ConfigError::EmptyHeader);
        }
        if self.rate_window == 0 {
            return Err(ConfigError::Zero("rate window"));
        }
        if self.inference_timeout_ms == 0 {
            return Err(ConfigError::Zero("inference timeout"));
        }
        if self.batch_queue == 0 {
            return Err(ConfigError::Zero("batch queue"));
        }
        Ok(())
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval > 0).then(|| Duration::from_secs(self.sweep_interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["ml-gateway"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_reference_service() {
        let args = Args::try_parse_from(["ml-gateway", "--api-key", "k"]).unwrap();
        assert_eq!(args.api_key_header, "X-API-Key");
        assert_eq!(args.rate_window(), Duration::from_secs(60));
        assert_eq!(args.inference_timeout(), Duration::from_secs(5));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn rejects_zero_window_and_empty_secret() {
        let args = parse(&["--api-key", "k", "--rate-window", "0"]);
        assert_eq!(args.validate(), Err(ConfigError::Zero("rate window")));

        let args = parse(&["--api-key", ""]);
        assert_eq!(args.validate(), Err(ConfigError::EmptyApiKey));
    }

    #[test]
    fn zero_sweep_interval_disables_sweeper() {
        let args = parse(&["--api-key", "k", "--sweep-interval", "0"]);
        assert_eq!(args.sweep_interval(), None);
    }
}
