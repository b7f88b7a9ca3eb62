use std::time::{Duration, Instant};

/// Result of a single failed attempt, as judged by the operation itself.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Transient; try again if the budget allows.
    Retry(E),
    /// Retrying cannot help.
    Abort(E),
}

#[derive(Debug)]
pub enum RetryError<E> {
    Aborted(E),
    Exhausted { attempts: u32, last: E },
}

/// Bounded exponential backoff: at most `max_attempts` tries, never
/// sleeping past `max_elapsed` since the first try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub max_elapsed: Duration,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            max_elapsed: Duration::from_secs(60),
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the `failures`th consecutive failure.
    pub fn delay_after(&self, failures: u32) -> Duration {
        let factor = 1u32
            .checked_shl(failures.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    pub fn run<T, E: std::fmt::Display>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, Attempt<E>>,
    ) -> Result<T, RetryError<E>> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match op(attempt) {
                Ok(value) => return Ok(value),
                Err(Attempt::Abort(err)) => return Err(RetryError::Aborted(err)),
                Err(Attempt::Retry(err)) => err,
            };

            if attempt >= self.max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.delay_after(attempt);
            if started.elapsed().saturating_add(delay) > self.max_elapsed {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Attempt failed, backing off"
            );
            std::thread::sleep(delay);
        }
    }
}
