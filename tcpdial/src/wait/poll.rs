use super::{Interest, Readiness, ReadinessWait};
use crate::sys::{RawFd, sys_poll};

use std::io;
use std::time::Duration;

/// Event-descriptor backend.
///
/// Watches a single entry for input and/or output readiness; error
/// and hang-up conditions are reported in [`Readiness::error`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PollWait;

impl ReadinessWait for PollWait {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn wait_once(
        &self,
        fd: RawFd,
        interest: Interest,
        timeout: Duration,
    ) -> io::Result<Option<Readiness>> {
        sys_poll(fd, interest, timeout)
    }
}
