use crate::error::{Error, Result};
use crate::sys::{
    ModeFlags, RawFd, sys_close, sys_connect, sys_read, sys_restore_mode, sys_set_nonblocking,
    sys_socket, sys_take_socket_error, sys_write,
};

use std::io;
use std::mem;
use std::net::SocketAddrV4;
use tracing::{debug, warn};

/// An owned IPv4 stream socket.
///
/// The descriptor is released exactly once: either by [`close`](Self::close),
/// which reports the result, or by `Drop`, which logs a failure.
#[derive(Debug)]
pub struct Socket {
    fd: RawFd,
}

impl Socket {
    /// Allocates a new blocking stream socket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Socket`] if the system refuses to allocate one.
    pub fn new() -> Result<Self> {
        let fd = sys_socket().map_err(Error::Socket)?;
        debug!(fd = ?fd, "socket created");

        Ok(Self { fd })
    }

    /// Returns the underlying descriptor.
    pub fn as_raw(&self) -> RawFd {
        self.fd
    }

    pub(crate) fn connect(&self, addr: &SocketAddrV4) -> io::Result<()> {
        sys_connect(self.fd, addr)
    }

    /// Fetches and clears the pending `SO_ERROR` value.
    ///
    /// Returns `Ok(None)` when no error is latched, `Ok(Some(e))` with
    /// the latched code otherwise. `Err` means the fetch itself failed.
    pub fn take_error(&self) -> io::Result<Option<io::Error>> {
        match sys_take_socket_error(self.fd)? {
            0 => Ok(None),
            code => Ok(Some(io::Error::from_raw_os_error(code))),
        }
    }

    pub(crate) fn read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        sys_read(self.fd, buffer)
    }

    pub(crate) fn write(&self, buffer: &[u8]) -> io::Result<usize> {
        sys_write(self.fd, buffer)
    }

    /// Closes the socket and reports the result.
    pub fn close(self) -> io::Result<()> {
        let fd = self.fd;
        mem::forget(self);

        sys_close(fd)
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if let Err(e) = sys_close(self.fd) {
            warn!(fd = ?self.fd, error = %e, "socket close failed");
        }
    }
}

/// Scoped non-blocking mode.
///
/// Entering saves the socket's current flags and sets non-blocking
/// mode. The saved flags are put back by [`restore`](Self::restore) or,
/// on every other exit path, when the guard is dropped.
#[derive(Debug)]
pub struct NonBlocking<'a> {
    socket: &'a Socket,
    saved: ModeFlags,
    armed: bool,
}

impl<'a> NonBlocking<'a> {
    /// Switches `socket` to non-blocking mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Mode`] if the flags cannot be read or written.
    pub fn enter(socket: &'a Socket) -> Result<Self> {
        let saved = sys_set_nonblocking(socket.as_raw()).map_err(Error::Mode)?;

        Ok(Self {
            socket,
            saved,
            armed: true,
        })
    }

    /// Restores the saved flags now and reports the result.
    pub fn restore(mut self) -> Result<()> {
        self.armed = false;
        sys_restore_mode(self.socket.as_raw(), self.saved).map_err(Error::Mode)
    }

    /// Leaves the socket non-blocking and hands the saved flags to the
    /// caller, who becomes responsible for restoring them.
    pub(crate) fn keep(mut self) -> ModeFlags {
        self.armed = false;
        self.saved
    }
}

impl Drop for NonBlocking<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        if let Err(e) = sys_restore_mode(self.socket.as_raw(), self.saved) {
            warn!(fd = ?self.socket.as_raw(), error = %e, "could not restore socket mode");
        }
    }
}
