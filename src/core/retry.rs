//! Bounded retries for model calls.
//!
//! A policy is derived from the `[ai]` section. The default policy neither
//! retries nor times out, so the first failure reaches the caller.

use std::future::Future;
use std::time::{Duration, Instant};

use super::config::AiConfig;

/// How failed model calls are repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Extra calls allowed after the first failure
    pub retries: u32,

    /// Pause before the first retry
    pub base_delay: Duration,

    /// Longest pause between two calls
    pub max_delay: Duration,

    /// Growth factor of the pause per retry
    pub multiplier: f64,

    /// Stretch each pause by up to a quarter
    pub jitter: bool,

    /// Upper bound on a single call
    pub call_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: true,
            call_timeout: None,
        }
    }
}

impl RetryConfig {
    /// Policy for the given `[ai]` section.
    pub fn from_ai_config(config: &AiConfig) -> Self {
        Self {
            retries: config.retries,
            call_timeout: config.timeout_secs.map(Duration::from_secs),
            ..Self::default()
        }
    }

    /// True when wrapping a provider in this policy would change nothing.
    pub fn is_passthrough(&self) -> bool {
        self.retries == 0 && self.call_timeout.is_none()
    }

    /// Pause before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let Some(exponent) = retry.checked_sub(1) else {
            return Duration::ZERO;
        };

        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        let millis = (self.base_delay.as_secs_f64() * 1000.0 * self.multiplier.powi(exponent))
            .min(self.max_delay.as_secs_f64() * 1000.0);
        let millis = if self.jitter { millis * (1.0 + jitter_fraction() / 4.0) } else { millis };

        Duration::from_millis(millis as u64)
    }
}

/// Cheap value in `[0, 1)` taken from the clock.
fn jitter_fraction() -> f64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.subsec_nanos());
    f64::from(nanos % 1024) / 1024.0
}

/// What happened while retrying.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// Last result (the success, or the final error)
    pub result: Result<T, E>,

    /// Calls made, first one included
    pub calls: u32,

    /// Wall time including pauses
    pub elapsed: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn retried(&self) -> bool {
        self.calls > 1
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Call `operation` until it succeeds or the policy runs out of retries.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryConfig, mut operation: F) -> RetryOutcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let started = Instant::now();
    let mut calls = 0;

    let result = loop {
        calls += 1;
        match operation().await {
            Err(e) if calls <= policy.retries => {
                let pause = policy.backoff(calls);
                tracing::warn!(
                    call = calls,
                    pause_ms = pause.as_millis() as u64,
                    error = %e,
                    "Model call failed, retrying"
                );
                tokio::time::sleep(pause).await;
            }
            result => break result,
        }
    };

    RetryOutcome { result, calls, elapsed: started.elapsed() }
}
