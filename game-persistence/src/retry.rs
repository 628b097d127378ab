use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounded polling schedule for reads that may lag behind a write.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Self::default()
        }
    }

    /// Delay to wait after the given one, capped at `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// The full wait schedule between attempts.
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 1..self.max_attempts.max(1) {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

/// Re-run `read_fn` until `is_visible` accepts its output or attempts run out.
///
/// Running out of attempts is not an error: the last successful read is
/// returned as-is. A read error is returned only if it happens on the final
/// attempt.
pub async fn read_until_visible<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut read_fn: F,
    is_visible: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_delay.min(policy.max_delay);
    let mut attempt = 1;

    loop {
        let last_attempt = attempt >= max_attempts;

        match read_fn().await {
            Ok(value) if is_visible(&value) => {
                if attempt > 1 {
                    info!(
                        "read_retry=visible attempts={} max_attempts={}",
                        attempt, max_attempts
                    );
                }
                return Ok(value);
            }
            Ok(value) if last_attempt => {
                warn!(
                    "read_retry=exhausted attempts={} returning last read",
                    attempt
                );
                return Ok(value);
            }
            Err(e) if last_attempt => {
                warn!("read_retry=failed attempts={} error={}", attempt, e);
                return Err(e);
            }
            Ok(_) => {
                debug!(
                    "read_retry=not_visible attempt={} max_attempts={} delay_ms={}",
                    attempt,
                    max_attempts,
                    delay.as_millis()
                );
            }
            Err(e) => {
                warn!(
                    "read_retry=error attempt={} max_attempts={} delay_ms={} error={}",
                    attempt,
                    max_attempts,
                    delay.as_millis(),
                    e
                );
            }
        }

        tokio::time::sleep(delay).await;
        delay = policy.next_delay(delay);
        attempt += 1;
    }
}
