use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Retries the operation produced by `factory` up to `times` extra times.
///
/// The operation runs at most `times + 1` times in total.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tcpdial::tools::retry;
///
/// let mut calls = 0;
/// let result = retry(3, || {
///     calls += 1;
///     if calls < 3 { Err("busy") } else { Ok(calls) }
/// })
/// .set_interval(Duration::from_millis(1))
/// .run();
///
/// assert_eq!(result, Ok(3));
/// ```
pub fn retry<G, T, E>(times: usize, factory: G) -> Retry<G, E>
where
    G: FnMut() -> Result<T, E>,
{
    Retry::new(times, factory)
}

pub struct Retry<G, E> {
    factory: G,

    /// Decides whether an error is worth another attempt.
    predicate: Option<Box<dyn Fn(&E) -> bool>>,

    remaining: usize,
    interval: Duration,
    backoff: u32,
}

impl<G, E> Retry<G, E> {
    fn new(times: usize, factory: G) -> Self {
        Self {
            factory,
            predicate: None,
            remaining: times,
            interval: Duration::ZERO,
            backoff: 1,
        }
    }

    /// Sleeps `interval` before the first retry.
    pub fn set_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Multiplies the delay by `factor` after every failed retry.
    pub fn set_backoff(mut self, factor: u32) -> Self {
        self.backoff = factor.max(1);
        self
    }

    /// Only retries errors for which `predicate` returns `true`.
    pub fn when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&E) -> bool + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Runs the operation until it succeeds, the limit is reached, or
    /// an error is rejected by the predicate. The last error is returned.
    pub fn run<T>(mut self) -> Result<T, E>
    where
        G: FnMut() -> Result<T, E>,
    {
        let mut delay = self.interval;

        loop {
            let err = match (self.factory)() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let retryable = self.predicate.as_ref().is_none_or(|p| p(&err));
            if self.remaining == 0 || !retryable {
                return Err(err);
            }

            self.remaining -= 1;
            debug!(remaining = self.remaining, ?delay, "retrying");

            if !delay.is_zero() {
                thread::sleep(delay);
            }
            delay = delay.saturating_mul(self.backoff);
        }
    }
}

impl<G, E> fmt::Debug for Retry<G, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("remaining", &self.remaining)
            .field("interval", &self.interval)
            .field("backoff", &self.backoff)
            .finish()
    }
}
