//! Bounded retry with exponential backoff.
//!
//! Used by the startup phase (WiFi join on ESP32, listener bind on Linux).
//! The policy itself is runtime-agnostic; the caller supplies the sleep.

use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Retry policy: how many attempts and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Backoff {
    /// Delay after the first failed attempt.
    #[serde(with = "millis")]
    pub initial: Duration,

    /// Upper bound for any single delay.
    #[serde(with = "millis")]
    pub max_delay: Duration,

    /// Growth factor between consecutive delays.
    pub factor: u32,

    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            factor: 2,
            max_attempts: 10,
        }
    }
}

/// Returned when every attempt failed.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl Backoff {
    /// Attempts actually made; a zero budget still tries once.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delays slept between consecutive attempts (`attempts() - 1` items).
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let Backoff {
            initial,
            max_delay,
            factor,
            ..
        } = *self;
        let mut next = initial.min(max_delay);

        (1..self.attempts()).map(move |_| {
            let delay = next;
            next = next.saturating_mul(factor).min(max_delay);
            delay
        })
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. `sleep` is called with each
    /// backoff delay between failed attempts.
    pub fn retry_blocking<T, E: Display>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, E>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, RetryError<E>> {
        let attempts = self.attempts();
        let mut delays = self.delays();
        let mut attempt = 1;

        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= attempts => {
                    return Err(RetryError::Exhausted { attempts, last })
                }
                Err(err) => {
                    let delay = delays.next().unwrap_or(self.max_delay);
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, attempts, err, delay
                    );
                    sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

/// `Duration` as integer milliseconds.
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_default_delays_double_and_cap() {
        let delays: Vec<_> = Backoff::default().delays().collect();
        assert_eq!(
            delays,
            vec![
                ms(500),
                ms(1000),
                ms(2000),
                ms(4000),
                ms(8000),
                ms(8000),
                ms(8000),
                ms(8000),
                ms(8000)
            ]
        );
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = Backoff {
            max_attempts: 0,
            ..Default::default()
        };
        let mut calls = 0;
        let result: Result<(), _> = policy.retry_blocking(
            |_| {
                calls += 1;
                Err("down")
            },
            |_| panic!("no sleep expected"),
        );

        assert_eq!(calls, 1);
        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 1, last: "down" })
        ));
    }

    #[test]
    fn test_succeeds_after_failures() {
        let policy = Backoff {
            initial: ms(100),
            max_delay: ms(250),
            factor: 2,
            max_attempts: 5,
        };
        let mut slept = Vec::new();

        let result = policy.retry_blocking(
            |attempt| if attempt < 4 { Err("no link") } else { Ok(attempt) },
            |delay| slept.push(delay),
        );

        assert_eq!(result.unwrap(), 4);
        assert_eq!(slept, vec![ms(100), ms(200), ms(250)]);
    }

    #[test]
    fn test_exhaustion_reports_last_error() {
        let policy = Backoff {
            initial: ms(1),
            max_delay: ms(1),
            factor: 1,
            max_attempts: 3,
        };
        let mut slept = 0;

        let err = policy
            .retry_blocking(
                |attempt| Err::<(), _>(format!("attempt {} failed", attempt)),
                |_| slept += 1,
            )
            .unwrap_err();

        assert_eq!(slept, 2);
        assert_eq!(err.to_string(), "gave up after 3 attempts: attempt 3 failed");
    }

    #[test]
    fn test_serde_uses_milliseconds() {
        let json = serde_json::json!({ "initial": 250, "maxAttempts": 4 });
        let policy: Backoff = serde_json::from_value(json).unwrap();

        assert_eq!(policy.initial, ms(250));
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.max_delay, Backoff::default().max_delay);

        let back = serde_json::to_value(policy).unwrap();
        assert_eq!(back["maxDelay"], 8000);
    }
}
