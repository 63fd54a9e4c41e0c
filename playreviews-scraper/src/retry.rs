//! Retrying failed calls with exponential backoff.

use playreviews_settings::RetrySettings;
use std::{fmt::Display, future::Future, time::Duration};

/// How many times, and how patiently, to retry a failing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least one.
    pub max_attempts: u32,
    /// The pause after the first failed attempt.
    pub base_delay: Duration,
    /// The longest pause between attempts.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// The pause after failed attempt number `attempt`, counting from 1.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        2_u32
            .checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: settings.base_delay,
            max_delay: settings.max_delay,
        }
    }
}

/// Run `operation` until it succeeds, fails with an error `is_retryable`
/// rejects, or runs out of attempts.
///
/// `operation` is passed the number of the attempt, counting from 1. The
/// error of the last attempt is returned if no attempt succeeds.
pub async fn with_retry<Op, Fut, T, E, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: Op,
) -> Result<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts && is_retryable(&error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    r#type = "scraper.http.retry",
                    %error,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Upstream call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{with_retry, RetryPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn delays_double_and_cap() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_after(4), Duration::from_millis(5000));
        assert_eq!(policy.delay_after(64), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn first_success_is_returned() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(
            &quick_policy(3),
            |_: &String| true,
            move |_attempt| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(42) }
            },
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let result = with_retry(
            &quick_policy(3),
            |_: &&str| true,
            |attempt| async move {
                if attempt < 3 {
                    Err("temporary error")
                } else {
                    Ok(attempt)
                }
            },
        )
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_with_the_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), String> = with_retry(
            &quick_policy(3),
            |_: &String| true,
            move |attempt| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {}", attempt)) }
            },
        )
        .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), &str> = with_retry(
            &quick_policy(5),
            |error: &&str| *error != "permanent",
            move |_attempt| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent") }
            },
        )
        .await;

        assert_eq!(result, Err("permanent"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let result: Result<u32, &str> = with_retry(
            &quick_policy(0),
            |_: &&str| true,
            |attempt| async move { Ok(attempt) },
        )
        .await;
        assert_eq!(result, Ok(1));
    }
}
