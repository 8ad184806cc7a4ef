use crate::error::{Error, Result};
use crate::net::{Endpoint, Socket};
use crate::sys::common::Readiness;
use crate::sys::{ModeFlags, RawFd, sys_restore_mode};

use std::io;
use tracing::{info, warn};

/// Size of the buffer used by [`Connection::read_once`].
pub const READ_BUFFER_SIZE: usize = 1024;

/// How the connect that produced a [`Connection`] completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// Blocking connect; no readiness wait happened.
    Blocking,

    /// Non-blocking connect that succeeded without waiting.
    Immediate,

    /// Non-blocking connect resolved after a wait reported these bits.
    Fired(Readiness),
}

/// A connected, full-duplex byte channel.
///
/// A `Connection` owns its socket. It is closed exactly once, either
/// through [`close`](Self::close) or when dropped.
#[derive(Debug)]
pub struct Connection {
    socket: Socket,
    peer: Endpoint,
    wake: Wake,

    /// Flags to restore when the socket was left non-blocking.
    saved_mode: Option<ModeFlags>,
}

impl Connection {
    pub(crate) fn new(
        socket: Socket,
        peer: Endpoint,
        wake: Wake,
        saved_mode: Option<ModeFlags>,
    ) -> Self {
        Self {
            socket,
            peer,
            wake,
            saved_mode,
        }
    }

    /// The endpoint this connection was established to.
    pub fn peer(&self) -> Endpoint {
        self.peer
    }

    /// How the connect completed.
    pub fn wake(&self) -> Wake {
        self.wake
    }

    /// Returns `true` while the socket is still in non-blocking mode.
    pub fn is_nonblocking(&self) -> bool {
        self.saved_mode.is_some()
    }

    pub fn as_raw(&self) -> RawFd {
        self.socket.as_raw()
    }

    /// Puts the socket back into the mode it had before the connect.
    ///
    /// Does nothing if the socket is already blocking.
    pub fn restore_blocking(&mut self) -> Result<()> {
        if let Some(flags) = self.saved_mode.take() {
            sys_restore_mode(self.socket.as_raw(), flags).map_err(Error::Mode)?;
        }

        Ok(())
    }

    /// Writes `buffer` with a single call.
    ///
    /// # Errors
    ///
    /// A write that accepts fewer bytes than `buffer.len()` is logged and
    /// reported as [`Error::ShortWrite`].
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize> {
        let n = self.socket.write(buffer)?;

        if n != buffer.len() {
            warn!(written = n, expected = buffer.len(), "short write");
            return Err(Error::ShortWrite {
                written: n,
                expected: buffer.len(),
            });
        }

        info!(bytes = n, "sent");
        Ok(n)
    }

    /// Writes the entire buffer, looping over partial writes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShortWrite`] if a write reports progress of zero.
    pub fn write_all(&mut self, buffer: &[u8]) -> Result<usize> {
        let mut remaining = buffer;

        while !remaining.is_empty() {
            let n = match self.socket.write(remaining) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if n == 0 {
                return Err(Error::ShortWrite {
                    written: buffer.len() - remaining.len(),
                    expected: buffer.len(),
                });
            }

            remaining = &remaining[n..];
        }

        info!(bytes = buffer.len(), "sent");
        Ok(buffer.len())
    }

    /// Issues exactly one read of at most [`READ_BUFFER_SIZE`] bytes.
    ///
    /// Whatever that read returns is the whole response; an empty vector
    /// means the peer closed its side.
    pub fn read_once(&mut self) -> Result<Vec<u8>> {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let n = self.socket.read(&mut buffer)?;

        info!(bytes = n, "read");
        Ok(buffer[..n].to_vec())
    }

    /// Closes the connection and reports the result.
    pub fn close(self) -> Result<()> {
        self.socket.close()?;

        info!(peer = %self.peer, "socket closed");
        Ok(())
    }
}
