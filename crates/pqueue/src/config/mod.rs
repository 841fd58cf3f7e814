//! Queue configuration
//!
//! Provides compile-time defaults with runtime environment overrides.
//!
//! # Configuration Priority (highest wins)
//!
//! 1. Builder calls (programmatic)
//! 2. Environment variables (runtime, via `from_env`)
//! 3. Library defaults (`config::defaults`)
//!
//! # Example
//!
//! ```rust,ignore
//! use pqueue::config::QueueConfig;
//!
//! // Use defaults with env overrides
//! let config = QueueConfig::from_env();
//!
//! // Or customize programmatically
//! let config = QueueConfig::from_env()
//!     .limit(1024)
//!     .cancel_poll_interval(Duration::from_millis(5));
//! ```

pub mod defaults;

use std::time::Duration;
use pqueue_core::env::{env_get, env_get_bool, env_get_millis, env_is_set};
use pqueue_core::kprintln;

/// Queue configuration with builder pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of queued items (0 = unbounded)
    pub limit: usize,
    /// Slots pre-allocated in the ordered store
    pub initial_capacity: usize,
    /// Wait slice between token checks in `dequeue_cancellable`
    pub cancel_poll_interval: Duration,
    /// Raise the process-wide kprint level to debug when a queue is built
    /// from this config. Ignored when `PQ_LOG_LEVEL` is set; never lowered
    /// again by the queue.
    pub debug_logging: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl QueueConfig {
    /// Create config from compile-time defaults with environment overrides.
    ///
    /// Environment variables (all optional):
    /// - `PQ_LIMIT` - Maximum queued items, 0 for unbounded
    /// - `PQ_INITIAL_CAPACITY` - Pre-allocated store slots
    /// - `PQ_CANCEL_POLL_MS` - Cancellable dequeue wait slice in milliseconds
    /// - `PQ_DEBUG` - Enable debug logging (0/1)
    pub fn from_env() -> Self {
        Self {
            limit: env_get("PQ_LIMIT", defaults::LIMIT),
            initial_capacity: env_get("PQ_INITIAL_CAPACITY", defaults::INITIAL_CAPACITY),
            cancel_poll_interval: env_get_millis("PQ_CANCEL_POLL_MS", defaults::CANCEL_POLL_MS),
            debug_logging: env_get_bool("PQ_DEBUG", defaults::DEBUG_LOGGING),
        }
    }

    /// Create config with explicit defaults (no env override).
    /// Useful for testing or when you want full control.
    pub fn new() -> Self {
        Self {
            limit: defaults::LIMIT,
            initial_capacity: defaults::INITIAL_CAPACITY,
            cancel_poll_interval: Duration::from_millis(defaults::CANCEL_POLL_MS),
            debug_logging: defaults::DEBUG_LOGGING,
        }
    }

    // Builder methods

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn initial_capacity(mut self, cap: usize) -> Self {
        self.initial_capacity = cap;
        self
    }

    pub fn cancel_poll_interval(mut self, d: Duration) -> Self {
        self.cancel_poll_interval = d;
        self
    }

    pub fn debug_logging(mut self, enable: bool) -> Self {
        self.debug_logging = enable;
        self
    }

    /// Store capacity to pre-allocate: never more than a bounded queue can hold
    pub fn effective_capacity(&self) -> usize {
        if self.limit > 0 {
            self.initial_capacity.min(self.limit)
        } else {
            self.initial_capacity
        }
    }

    /// Whether building a queue from this config should raise the global log
    /// level. An explicit `PQ_LOG_LEVEL` always wins.
    pub fn raises_log_level(&self) -> bool {
        self.debug_logging && !env_is_set("PQ_LOG_LEVEL")
    }

    /// Validate configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cancel_poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue("cancel_poll_interval must be > 0"));
        }
        Ok(())
    }

    /// Print configuration (for debugging)
    pub fn print(&self) {
        kprintln!("Queue Configuration:");
        kprintln!("  limit:                  {}", self.limit);
        kprintln!("  initial_capacity:       {}", self.initial_capacity);
        kprintln!("  cancel_poll_interval:   {:?}", self.cancel_poll_interval);
        kprintln!("  debug_logging:          {}", self.debug_logging);
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = QueueConfig::new();
        assert_eq!(config.limit, defaults::LIMIT);
        assert_eq!(config.initial_capacity, defaults::INITIAL_CAPACITY);
        assert_eq!(
            config.cancel_poll_interval,
            Duration::from_millis(defaults::CANCEL_POLL_MS)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = QueueConfig::new()
            .limit(100)
            .initial_capacity(16)
            .cancel_poll_interval(Duration::from_millis(5))
            .debug_logging(true);

        assert_eq!(config.limit, 100);
        assert_eq!(config.initial_capacity, 16);
        assert_eq!(config.cancel_poll_interval, Duration::from_millis(5));
        assert!(config.debug_logging);
    }

    #[test]
    fn test_validation() {
        let config = QueueConfig::new().cancel_poll_interval(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue("cancel_poll_interval must be > 0"))
        );
    }

    #[test]
    fn test_effective_capacity() {
        assert_eq!(QueueConfig::new().limit(0).initial_capacity(64).effective_capacity(), 64);
        assert_eq!(QueueConfig::new().limit(10).initial_capacity(64).effective_capacity(), 10);
        assert_eq!(QueueConfig::new().limit(100).initial_capacity(64).effective_capacity(), 64);
    }

    #[test]
    fn test_debug_logging_yields_to_log_level_env() {
        let config = QueueConfig::new().debug_logging(true);
        assert!(!QueueConfig::new().raises_log_level());

        std::env::set_var("PQ_LOG_LEVEL", "warn");
        let with_env = config.raises_log_level();
        std::env::remove_var("PQ_LOG_LEVEL");

        assert!(!with_env);
        assert!(config.raises_log_level());
    }

    #[test]
    fn test_from_env_overrides() {
        std::env::set_var("PQ_LIMIT", "25");
        std::env::set_var("PQ_CANCEL_POLL_MS", "3");
        let config = QueueConfig::from_env();
        std::env::remove_var("PQ_LIMIT");
        std::env::remove_var("PQ_CANCEL_POLL_MS");

        assert_eq!(config.limit, 25);
        assert_eq!(config.cancel_poll_interval, Duration::from_millis(3));
    }
}
