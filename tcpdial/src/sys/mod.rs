//! Platform-specific syscall layer.
//!
//! Everything above this module talks to the operating system only
//! through the `sys_*` functions re-exported here, so the connector
//! and the wait backends stay platform independent.
//!
//! The concrete implementation is selected at compile time
//! depending on the target operating system.

pub(crate) mod common;

#[cfg(unix)]
pub(crate) mod unix;

#[cfg(windows)]
pub(crate) mod windows;

#[cfg(unix)]
pub(crate) use unix as platform;

#[cfg(windows)]
pub(crate) use windows as platform;

pub(crate) use platform::{
    ModeFlags, sys_close, sys_connect, sys_is_in_progress, sys_poll, sys_read, sys_restore_mode,
    sys_select, sys_set_nonblocking, sys_socket, sys_take_socket_error, sys_write,
};

pub use platform::RawFd;
