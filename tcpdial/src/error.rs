//! Error types

use crate::net::Endpoint;

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a connection attempt or a session.
#[derive(Debug, Error)]
pub enum Error {
    /// The socket could not be allocated
    #[error("could not open socket: {0}")]
    Socket(#[source] io::Error),

    /// The host is not a dotted-quad IPv4 address
    #[error("invalid address `{input}`: {reason}")]
    Address {
        input: String,
        reason: &'static str,
    },

    /// Mode flags could not be read or changed
    #[error("could not change socket mode: {0}")]
    Mode(#[source] io::Error),

    /// `connect` failed right away with something other than "in progress"
    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// Nothing became ready before the deadline
    #[error("connect to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: Endpoint, timeout: Duration },

    /// The readiness wait itself failed
    #[error("readiness wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The wait returned but the descriptor was not flagged in any set
    #[error("wait returned but the socket was not flagged ready")]
    NotReady,

    /// `SO_ERROR` could not be fetched
    #[error("could not fetch pending socket error: {0}")]
    SockOpt(#[source] io::Error),

    /// The handshake failed; `source` carries the deferred `SO_ERROR` code
    #[error("connect to {endpoint} failed: {source}")]
    Deferred {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// A write made no progress
    #[error("short write: {written} of {expected} bytes accepted")]
    ShortWrite { written: usize, expected: usize },

    /// Read, write or close failure
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Raw OS error code behind this error, if any.
    ///
    /// For [`Error::Deferred`] this is exactly the code latched in `SO_ERROR`.
    pub fn os_code(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }

    /// I/O error kind behind this error, if any.
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            Error::Timeout { .. } => Some(io::ErrorKind::TimedOut),
            other => other.io_error().map(io::Error::kind),
        }
    }

    /// Returns `true` for [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns `true` if another attempt could plausibly succeed.
    ///
    /// Timeouts and refused/reset/aborted handshakes are transient; a
    /// bad address or a socket that cannot be allocated is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Connect { source, .. } | Error::Deferred { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::Socket(e) | Error::Mode(e) | Error::Wait(e) | Error::SockOpt(e) => Some(e),
            Error::Connect { source, .. } | Error::Deferred { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
