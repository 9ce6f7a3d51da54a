use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, info};

use crate::auth::Credential;
use crate::metrics::TRACKED_KEYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds.")]
    RateLimitExceeded { limit: u32, retry_after_secs: u64 },
}

// Admitted request timestamps for one key. Callers read the clock before
// taking the shard lock, so records are not guaranteed to be in order.
#[derive(Debug, Default)]
pub struct WindowState {
    records: VecDeque<Instant>,
}

impl WindowState {
    // drop everything at least `window` old
    fn prune(&mut self, now: Instant, window: Duration) {
        self.records.retain(|&t| now.saturating_duration_since(t) < window);
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // time until the oldest record leaves the window
    fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        self.records
            .iter()
            .min()
            .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(window)
    }
}

/// Per-key sliding window log. Each key's read-prune-count-append runs under
/// that key's shard lock, so concurrent callers never over-admit.
pub struct AdmissionController {
    windows: DashMap<String, WindowState>,
    limit: u32,
    window: Duration,
}

impl AdmissionController {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the quota left after this request.
    pub fn admit(&self, key: &Credential, now: Instant) -> Result<u32, AdmissionError> {
        match self.windows.entry(key.as_str().to_string()) {
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();
                state.prune(now, self.window);
                let count = state.len();

                if count >= self.limit as usize {
                    return Err(self.exceeded(state.retry_after(now, self.window)));
                }

                state.records.push_back(now);
                Ok(self.limit - count as u32 - 1)
            }
            Entry::Vacant(vacant) => {
                if self.limit == 0 {
                    return Err(self.exceeded(self.window));
                }
                let mut state = WindowState::default();
                state.records.push_back(now);
                vacant.insert(state);
                Ok(self.limit - 1)
            }
        }
    }

    fn exceeded(&self, retry_after: Duration) -> AdmissionError {
        // round up so clients never retry a moment too early
        let mut secs = retry_after.as_secs();
        if retry_after.subsec_nanos() > 0 {
            secs += 1;
        }
        AdmissionError::RateLimitExceeded {
            limit: self.limit,
            retry_after_secs: secs,
        }
    }

    /// Drops every window whose records have all expired.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, state| {
            state.prune(now, self.window);
            !state.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

// Background sweep so idle keys don't hold memory forever
pub async fn sweeper(controller: Arc<AdmissionController>, every: Duration) {
    let mut interval = interval(every);
    info!("Window sweeper started (interval: {:?})", every);

    loop {
        interval.tick().await;
        let evicted = controller.evict_idle(Instant::now());
        let remaining = controller.tracked_keys();
        TRACKED_KEYS.set(remaining as f64);
        if evicted > 0 {
            debug!(evicted, remaining, "Evicted idle rate limit windows");
        }
    }
}
