//! Waiting for socket readiness with a timeout.
//!
//! [`ReadinessWait`] is the one capability the non-blocking connector
//! needs from the operating system. Two interchangeable backends
//! implement it:
//! - [`SelectWait`]: readiness sets (`select(2)`),
//! - [`PollWait`]: an event descriptor entry (`poll(2)` / `WSAPoll`).

mod poll;
mod select;

pub use poll::PollWait;
pub use select::SelectWait;

pub use crate::sys::common::{Interest, Readiness};

use crate::sys::RawFd;

use std::fmt;
use std::io;
use std::time::{Duration, Instant};
use tracing::trace;

/// Blocks until a descriptor is ready or a timeout elapses.
pub trait ReadinessWait: fmt::Debug {
    /// Backend name, used in logs.
    fn name(&self) -> &'static str;

    /// Performs a single wait call.
    ///
    /// Returns `Ok(None)` if the call timed out. Implementations may
    /// return early (e.g. `EINTR`); [`wait`](Self::wait) deals with that.
    fn wait_once(
        &self,
        fd: RawFd,
        interest: Interest,
        timeout: Duration,
    ) -> io::Result<Option<Readiness>>;

    /// Waits until `fd` is ready or `timeout` has fully elapsed.
    ///
    /// Interrupted calls and early timeouts are resumed with the time
    /// left, so `Ok(None)` is never returned before the deadline. A
    /// timeout too large to be represented as an [`Instant`] waits
    /// without bound.
    fn wait(
        &self,
        fd: RawFd,
        interest: Interest,
        timeout: Duration,
    ) -> io::Result<Option<Readiness>> {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };

            match self.wait_once(fd, interest, remaining) {
                Ok(Some(readiness)) => return Ok(Some(readiness)),
                Ok(None) if deadline.is_some_and(|d| Instant::now() >= d) => return Ok(None),
                Ok(None) => {
                    trace!(backend = self.name(), "woke before deadline, waiting again");
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    trace!(backend = self.name(), "wait interrupted, resuming");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
