//! Retry policy for remote service calls.
//!
//! Both remote clients (embedding and chat) compose this policy into their
//! request loops rather than duplicating inline backoff logic. Transient
//! failures (HTTP 429, 5xx, and network errors) are retried up to
//! `max_attempts` with exponential backoff; any other HTTP error fails
//! immediately.

use std::time::Duration;

use reqwest::StatusCode;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (so 3 means up to 2 retries).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Whether a response status warrants another attempt.
    /// Rate limiting (429) and server errors (5xx) are transient; any other
    /// client error is not.
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Backoff before retry number `attempt` (1-based): 1s, 2s, 4s, 8s, …
    /// capped at `base_delay << 5`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(5);
        self.base_delay * (1 << exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(policy.is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(policy.is_retryable(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_retryable(StatusCode::BAD_REQUEST));
        assert!(!policy.is_retryable(StatusCode::UNAUTHORIZED));
        assert!(!policy.is_retryable(StatusCode::NOT_FOUND));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), Duration::from_secs(32));
    }

    #[test]
    fn default_attempts_is_three() {
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }
}
