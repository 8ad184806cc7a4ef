//! Non-blocking connect state machine.
//!
//! ```text
//! Init ──► Connecting ──► Connected
//!              │              ▲
//!              ▼              │
//!           Pending ──► ResolveError
//!              │              │
//!              ▼              ▼
//!          TimedOut         Failed
//! ```
//!
//! A socket that becomes writable while connecting has not necessarily
//! connected: writability also fires when the handshake fails. The real
//! outcome is the deferred `SO_ERROR` code, fetched by
//! [`resolve_pending_connect_error`] once the wait returns.

use super::Sequencing;
use crate::error::{Error, Result};
use crate::net::{Connection, Endpoint, NonBlocking, Socket, Wake};
use crate::sys::sys_is_in_progress;
use crate::wait::{Interest, Readiness, ReadinessWait};

use std::time::Duration;
use tracing::{debug, info};

pub(crate) fn connect(
    endpoint: Endpoint,
    timeout: Duration,
    waiter: &dyn ReadinessWait,
    sequencing: Sequencing,
) -> Result<Connection> {
    let socket = Socket::new()?;
    let guard = NonBlocking::enter(&socket)?;

    let wake = match socket.connect(&endpoint.socket_addr()) {
        Ok(()) => {
            debug!("connected without waiting");
            Wake::Immediate
        }

        Err(e) if sys_is_in_progress(&e) => {
            debug!(backend = waiter.name(), ?timeout, "connect in progress");
            Wake::Fired(pending(&socket, endpoint, timeout, waiter)?)
        }

        Err(source) => return Err(Error::Connect { endpoint, source }),
    };

    // Non-blocking mode was only needed to race the handshake, unless the
    // caller wants to act on the individual wake bits first.
    let saved_mode = match sequencing {
        Sequencing::Unified => {
            guard.restore()?;
            None
        }
        Sequencing::PerWake => Some(guard.keep()),
    };

    info!("connected");
    Ok(Connection::new(socket, endpoint, wake, saved_mode))
}

/// Waits for the in-progress handshake and resolves its outcome.
fn pending(
    socket: &Socket,
    endpoint: Endpoint,
    timeout: Duration,
    waiter: &dyn ReadinessWait,
) -> Result<Readiness> {
    let readiness = waiter
        .wait(socket.as_raw(), Interest::BOTH, timeout)
        .map_err(Error::Wait)?
        .ok_or(Error::Timeout { endpoint, timeout })?;

    debug!(
        readable = readiness.readable,
        writable = readiness.writable,
        error = readiness.error,
        "socket woke"
    );

    if !readiness.any() {
        return Err(Error::NotReady);
    }

    resolve_pending_connect_error(socket, endpoint)?;

    Ok(readiness)
}

/// Resolves the outcome of a non-blocking connect after a wake.
///
/// Fetches the socket's deferred error code. A zero code means the
/// handshake succeeded.
///
/// # Errors
///
/// - [`Error::SockOpt`] if the code cannot be fetched,
/// - [`Error::Deferred`] carrying the latched code otherwise.
pub fn resolve_pending_connect_error(socket: &Socket, endpoint: Endpoint) -> Result<()> {
    match socket.take_error().map_err(Error::SockOpt)? {
        None => Ok(()),
        Some(source) => Err(Error::Deferred { endpoint, source }),
    }
}
