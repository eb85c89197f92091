//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions and implementations.

use std::time::Duration;

/// Rate limit configuration for a single sliding window
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub current: u32,
    pub limit: u32,
}

impl RateLimitResult {
    /// Build a result from an observed count in the window
    pub fn from_count(count: u32, config: &RateLimitConfig) -> Self {
        Self {
            allowed: count < config.max_requests,
            current: count,
            limit: config.max_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ms() {
        let config = RateLimitConfig::new(5, 60);
        assert_eq!(config.window_ms(), 60_000);
    }

    #[test]
    fn test_from_count_under_limit() {
        let config = RateLimitConfig::new(5, 60);
        let result = RateLimitResult::from_count(4, &config);
        assert!(result.allowed);
        assert_eq!(result.current, 4);
        assert_eq!(result.limit, 5);
    }

    #[test]
    fn test_from_count_at_limit() {
        let config = RateLimitConfig::new(5, 60);
        let result = RateLimitResult::from_count(5, &config);
        assert!(!result.allowed);
    }
}
