use std::{future::Future, time::Duration};

use rand::Rng;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::error::{CatalogError, CatalogResult};

/// Timeout and backoff applied to every catalog call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Budget granted to a single attempt.
    pub attempt_timeout: Duration,
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled after each failure.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Random spread applied to each delay, in `[0, 1]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(10),
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(16),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        let spread = self.jitter.clamp(0.0, 1.0);
        if spread == 0.0 {
            return delay;
        }
        let factor = rand::rng().random_range((1.0 - spread)..=(1.0 + spread));
        delay.mul_f64(factor)
    }
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts. Each attempt is bounded by
/// [`RetryPolicy::attempt_timeout`]; overrunning it counts as a transient
/// [`CatalogError::Timeout`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    path: &str,
    mut attempt: F,
) -> CatalogResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CatalogResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.base_delay;
    let mut tries = 0;

    loop {
        tries += 1;
        let outcome = match timeout(policy.attempt_timeout, attempt()).await {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Timeout {
                path: path.to_owned(),
                after: policy.attempt_timeout,
            }),
        };

        match outcome {
            Ok(value) => {
                if tries > 1 {
                    debug!(path, attempt = tries, "catalog call recovered after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && tries < max_attempts => {
                let wait = policy.jittered(delay);
                warn!(
                    path,
                    attempt = tries,
                    max_attempts,
                    delay_ms = wait.as_millis() as u64,
                    error = %err,
                    "catalog call failed; retrying"
                );
                sleep(wait).await;
                delay = policy.next_delay(delay);
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use reqwest::StatusCode;
    use tokio::time::Instant;

    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            attempt_timeout: Duration::from_secs(5),
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(16),
            jitter: 0.0,
        }
    }

    fn unavailable() -> CatalogError {
        CatalogError::from_status("games/1", StatusCode::SERVICE_UNAVAILABLE)
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_are_retried_with_doubling_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let counter = calls.clone();
        let result = run_with_retry(&policy(), "games/1", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s before the second attempt, 4s before the third.
        assert_eq!(started.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts_with_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: CatalogResult<()> = run_with_retry(&policy(), "games/1", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

        assert!(matches!(result, Err(CatalogError::ServerUnavailable { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn client_rejections_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: CatalogResult<()> = run_with_retry(&policy(), "games/1", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(CatalogError::from_status("games/1", StatusCode::NOT_FOUND)) }
        })
        .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_attempts_surface_timeout() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: CatalogResult<()> = run_with_retry(&policy(), "genres", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        })
        .await;

        match result {
            Err(CatalogError::Timeout { after, .. }) => assert_eq!(after, Duration::from_secs(5)),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(5),
            ..policy()
        };
        assert_eq!(
            policy.next_delay(Duration::from_secs(4)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn jitter_stays_within_spread() {
        let policy = RetryPolicy {
            jitter: 0.5,
            ..policy()
        };
        for _ in 0..100 {
            let delay = policy.jittered(Duration::from_secs(2));
            assert!(delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3));
        }
    }
}
