//! Login throttling for slowing brute force attempts

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Throttle configuration
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Attempts allowed per window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window_seconds: 300, // 5 minutes
        }
    }
}

#[derive(Debug)]
struct Window {
    attempts: u32,
    started: Instant,
}

/// Fixed-window login throttle keyed by the presented identifier
#[derive(Clone)]
pub struct LoginThrottle {
    config: ThrottleConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl LoginThrottle {
    /// Create a new throttle
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key`; false when the caller is over the limit
    pub async fn check(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            attempts: 0,
            started: now,
        });

        if now.duration_since(window.started) >= Duration::from_secs(self.config.window_seconds) {
            window.attempts = 0;
            window.started = now;
        }

        window.attempts += 1;
        if window.attempts > self.config.max_attempts {
            warn!("Throttled login attempts for {}", key);
            return false;
        }

        true
    }
}
