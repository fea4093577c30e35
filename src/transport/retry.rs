//! Exponential backoff policy for transient API failures.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transport::error::ApiError;

/// Retry configuration applied to every request a client issues.
///
/// Delays are deterministic: attempt `n` (0-based) waits
/// `min(initial_delay * backoff_multiplier^n, max_delay)`, with no jitter.
///
/// The serde form uses integer milliseconds (`initial_delay_ms`, `max_delay_ms`) and every field
/// is optional, so a partial override in a config file keeps the remaining defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,

    #[serde(rename = "initial_delay_ms", with = "duration_ms")]
    pub initial_delay: Duration,

    #[serde(rename = "max_delay_ms", with = "duration_ms")]
    pub max_delay: Duration,

    pub backoff_multiplier: f64,

    /// HTTP statuses worth retrying. Network failures carry status `0`, so adding `0` here
    /// opts them in.
    pub retryable_status_codes: BTreeSet<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
            retryable_status_codes: BTreeSet::from([408, 429, 500, 502, 503, 504]),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff to wait after failed attempt `attempt` (0-based), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.powi(exponent);
        let initial = self.initial_delay.as_nanos() as f64;
        let cap = self.max_delay.as_nanos() as f64;
        let delay = (initial * factor).min(cap);
        Duration::from_nanos(delay as u64)
    }

    pub fn is_retryable_status(&self, status_code: u16) -> bool {
        self.retryable_status_codes.contains(&status_code)
    }

    /// Whether a request that failed with `error` on attempt `attempt` gets another try.
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_retries && self.is_retryable_status(error.status_code)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.initial_delay.is_zero() {
            return Err("retry policy initial delay must be positive".to_owned());
        }
        if self.max_delay.is_zero() {
            return Err("retry policy max delay must be positive".to_owned());
        }
        if !(self.backoff_multiplier.is_finite() && self.backoff_multiplier > 1.0) {
            return Err(format!(
                "retry policy backoff multiplier must be greater than 1, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
