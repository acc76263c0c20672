//! Bounded retry with a fixed delay
//!
//! Upstream occasionally drops connections or answers with a gateway error under
//! load. Those failures are retried a fixed number of times; everything else
//! (bad arguments, unexpected response shapes) propagates immediately.
//!
//! # Example
//!
//! ```no_run
//! use leetcode_anki::retry::{IsRetryable, with_retry};
//! use leetcode_anki::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! with_retry(&config, || async {
//!     // Your operation here
//!     Ok::<_, MyError>(())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (connection reset, timeout, gateway errors) return `true`.
/// Logic failures (invalid range, data shape mismatch, cache miss) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Dropped connections, timeouts and protocol-level send failures
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            // Rate limited or upstream gateway trouble
            Error::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Error::Transient(_) => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ),
            Error::Config { .. }
            | Error::Range(_)
            | Error::Database(_)
            | Error::Sqlx(_)
            | Error::DataShape { .. }
            | Error::CacheMiss(_)
            | Error::NoSubmission(_)
            | Error::NoCode { .. }
            | Error::InvalidValue(_)
            | Error::Division(_)
            | Error::Cancelled
            | Error::Serialization(_) => false,
        }
    }
}

/// Execute an async operation, retrying transient failures
///
/// The operation runs at most `config.attempts` times. Between attempts the
/// combinator sleeps `config.delay` (optionally jittered). The error of the
/// final attempt, or the first non-retryable error, is returned unmodified.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let attempts = config.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < attempts => {
                let delay = if config.jitter {
                    add_jitter(config.delay)
                } else {
                    config.delay
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    attempts = attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "transient error"),
                TestError::Permanent => write!(f, "permanent error"),
            }
        }
    }

    impl IsRetryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn fast_config(attempts: u32) -> RetryConfig {
        RetryConfig {
            attempts,
            delay: Duration::from_millis(10),
            jitter: false,
        }
    }

    /// Fails with a transient error `failures` times, then returns 42
    async fn run_flaky(config: &RetryConfig, failures: u32) -> (Result<i32, TestError>, u32) {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(config, || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < failures {
                    Err(TestError::Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        (result, counter.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_success_no_retry() {
        let (result, calls) = run_flaky(&fast_config(3), 0).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1, "should only call once");
    }

    #[tokio::test]
    async fn test_fewer_failures_than_attempts_succeeds() {
        for k in 0..3 {
            let (result, calls) = run_flaky(&fast_config(3), k).await;
            assert_eq!(result.unwrap(), 42, "k={k}");
            assert_eq!(calls, k + 1, "k={k}: operation invoked k+1 times");
        }
    }

    #[tokio::test]
    async fn test_failures_reaching_attempts_propagate_last_error() {
        for k in [3, 4, 10] {
            let (result, calls) = run_flaky(&fast_config(3), k).await;
            assert_eq!(result.unwrap_err(), TestError::Transient, "k={k}");
            assert_eq!(calls, 3, "k={k}: operation invoked exactly `attempts` times");
        }
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&fast_config(5), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError::Permanent)
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), TestError::Permanent);
        assert_eq!(
            counter.load(Ordering::SeqCst),
            1,
            "should not retry permanent error"
        );
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let (result, calls) = run_flaky(&fast_config(0), 1).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_fixed_delay_between_attempts() {
        let config = RetryConfig {
            attempts: 3,
            delay: Duration::from_millis(40),
            jitter: false,
        };

        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _result = with_retry(&config, || {
            let ts = ts_clone.clone();
            async move {
                ts.lock().await.push(std::time::Instant::now());
                Err::<i32, _>(TestError::Transient)
            }
        })
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 3);
        for i in 1..ts.len() {
            let gap = ts[i].duration_since(ts[i - 1]);
            assert!(
                gap >= Duration::from_millis(35),
                "gap {i} should be ~40ms, was {gap:?}"
            );
            assert!(
                gap < Duration::from_millis(500),
                "gap {i} should not grow, was {gap:?}"
            );
        }
    }

    #[test]
    fn add_jitter_stays_within_bounds() {
        let delay = Duration::from_millis(50);
        for i in 0..200 {
            let jittered = add_jitter(delay);
            assert!(jittered >= delay, "iteration {i}: {jittered:?} < {delay:?}");
            assert!(jittered <= delay * 2, "iteration {i}: {jittered:?} > 2x");
        }
    }

    #[test]
    fn add_jitter_on_zero_delay_returns_zero() {
        assert_eq!(add_jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn transient_and_gateway_errors_are_retryable() {
        assert!(Error::Transient("connection reset".into()).is_retryable());
        for status in [429, 500, 502, 503, 504] {
            assert!(
                Error::Http {
                    status,
                    body: String::new()
                }
                .is_retryable(),
                "HTTP {status}"
            );
        }
        assert!(
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer"
            ))
            .is_retryable()
        );
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [400, 401, 403, 404] {
            assert!(
                !Error::Http {
                    status,
                    body: String::new()
                }
                .is_retryable(),
                "HTTP {status}"
            );
        }
    }

    #[test]
    fn logic_errors_are_never_retryable() {
        assert!(!Error::Range("start > total".into()).is_retryable());
        assert!(!Error::data_shape("question", "missing field").is_retryable());
        assert!(!Error::CacheMiss("two-sum".into()).is_retryable());
        assert!(!Error::InvalidValue("Incorrect difficulty: x".into()).is_retryable());
        assert!(!Error::Division("two-sum".into()).is_retryable());
        assert!(!Error::NoSubmission("two-sum".into()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(
            !Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied"
            ))
            .is_retryable()
        );
    }
}
