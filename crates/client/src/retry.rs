//! Retry policy with a fixed delay between tries.

use std::time::Duration;

/// Default number of tries, the first one included.
pub const DEFAULT_MAX_TRIES: u32 = 3;

/// Default pause between tries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of tries, the first one included. Never below 1.
    pub max_tries: u32,
    /// Delay slept before each retry.
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_tries: DEFAULT_MAX_TRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of tries (clamped to at least 1).
    pub fn with_max_tries(mut self, tries: u32) -> Self {
        self.max_tries = tries.max(1);
        self
    }

    /// Set the delay slept between tries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// A single try, no retries.
    pub fn no_retry() -> Self {
        Self {
            max_tries: 1,
            ..Default::default()
        }
    }
}

/// Per-call retry state. Counts tries starting at 1.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    tries: u32,
}

impl RetryPolicy {
    /// Create a new retry policy from config, positioned on the first try.
    pub fn new(config: RetryConfig) -> Self {
        Self { config, tries: 1 }
    }

    /// The current try number (1-indexed).
    pub fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns true if another try is allowed after the current one fails.
    pub fn should_retry(&self) -> bool {
        self.tries < self.config.max_tries.max(1)
    }

    /// Advance to the next try and return the delay to sleep first.
    /// Returns None once the tries are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.should_retry() {
            return None;
        }
        self.tries += 1;
        Some(self.config.retry_delay)
    }
}
