use super::{Interest, Readiness, ReadinessWait};
use crate::sys::{RawFd, sys_select};

use std::io;
use std::time::Duration;

/// Readiness-set backend.
///
/// Watches the descriptor in a read set and a write set. Only
/// descriptors below `FD_SETSIZE` can be waited on.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectWait;

impl ReadinessWait for SelectWait {
    fn name(&self) -> &'static str {
        "select"
    }

    fn wait_once(
        &self,
        fd: RawFd,
        interest: Interest,
        timeout: Duration,
    ) -> io::Result<Option<Readiness>> {
        sys_select(fd, interest, timeout)
    }
}
