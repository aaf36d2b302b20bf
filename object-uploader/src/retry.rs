use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_ATTEMPTS: u32 = 10;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Delay inserted after the n-th failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    Linear(Duration),
    Quadratic(Duration),
}

impl Backoff {
    pub fn delay(&self, failures: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Linear(d) => d.saturating_mul(failures),
            Backoff::Quadratic(d) => d.saturating_mul(failures.saturating_mul(failures)),
        }
    }
}

/// The last error of an operation that failed on every attempt.
#[derive(Debug)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub source: Box<dyn Error + Send + Sync>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, the first one included.
    pub attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: Backoff::Fixed(DEFAULT_DELAY),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Backoff) -> Self {
        Self { attempts, backoff }
    }

    /// Calls `action` until it succeeds or the attempt cap is reached.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut action: F) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Box<dyn Error + Send + Sync>>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match action().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => {
                    tracing::error!("{} failed after {} attempts: {}", operation, attempt, err);
                    return Err(RetryExhausted { attempts: attempt, source: err });
                }
                Err(err) => {
                    let delay = self.backoff.delay(attempt);
                    tracing::warn!("{} failed (attempt {}/{}): {}. Retrying in {:?}",
                                   operation, attempt, attempts, err, delay);
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type BoxError = Box<dyn Error + Send + Sync>;

    fn instant(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Backoff::Fixed(Duration::ZERO))
    }

    #[test]
    fn backoff_delays() {
        let d = Duration::from_secs(1);
        assert_eq!(Backoff::Fixed(d).delay(3), d);
        assert_eq!(Backoff::Linear(d).delay(3), Duration::from_secs(3));
        assert_eq!(Backoff::Quadratic(d).delay(3), Duration::from_secs(9));
    }

    #[tokio::test]
    async fn always_failing_action_is_called_exactly_attempts_times() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = instant(10)
            .run("create", || {
                calls.set(calls.get() + 1);
                async { Err::<(), BoxError>("boom".into()) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.get(), 10);
        assert_eq!(err.attempts, 10);
        assert_eq!(err.source.to_string(), "boom");
    }

    #[tokio::test]
    async fn succeeds_after_k_failures_with_k_plus_one_calls() {
        let calls = Cell::new(0u32);
        let value = instant(10)
            .run("create", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    let result: Result<u32, BoxError> = if n <= 3 {
                        Err("transient".into())
                    } else {
                        Ok(n)
                    };
                    result
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 4);
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = Cell::new(0u32);
        let _ = instant(0)
            .run("create", || {
                calls.set(calls.get() + 1);
                async { Err::<(), BoxError>("boom".into()) }
            })
            .await;
        assert_eq!(calls.get(), 1);
    }
}
