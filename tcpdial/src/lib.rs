//! # tcpdial
//!
//! **tcpdial** establishes TCP client connections to an IPv4 endpoint
//! and exchanges a single message over them. It is the smallest useful
//! piece of client plumbing: open a socket, complete the handshake,
//! write, read once, close.
//!
//! The handshake can be completed three ways:
//!
//! - **Blocking**: a plain `connect` that waits as long as the OS does
//! - **Select**: a non-blocking `connect` bounded by a timeout and
//!   resolved with readiness sets
//! - **Poll**: the same, resolved with an event descriptor
//!
//! The non-blocking modes never trust writability alone: once the wait
//! fires, the socket's deferred error code decides between success and
//! failure (see [`resolve_pending_connect_error`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tcpdial::{ConnectOutcome, Connector, Mode, Sequencing, DEFAULT_MESSAGE};
//! use tcpdial::net::Endpoint;
//!
//! let connector = Connector::builder()
//!     .endpoint(Endpoint::parse("127.0.0.1", 8649)?)
//!     .mode(Mode::Select)
//!     .timeout(Duration::from_secs(5))
//!     .build();
//!
//! match connector.connect() {
//!     ConnectOutcome::Connected(mut connection) => {
//!         let exchange = connection.exchange(DEFAULT_MESSAGE, Sequencing::Unified)?;
//!         println!("{:?}", exchange);
//!         connection.close()?;
//!     }
//!     ConnectOutcome::TimedOut { after, .. } => println!("timed out after {after:?}"),
//!     ConnectOutcome::Failed(e) => println!("failed: {e}"),
//! }
//! # Ok::<(), tcpdial::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`net`] — Endpoint, owned socket, scoped non-blocking guard, connection
//! - [`wait`] — Readiness wait with `select` and `poll` backends
//! - [`tools`] — Bounded retry with interval and backoff

mod connector;
mod error;
mod sys;

pub mod net;
pub mod tools;
pub mod wait;

pub use connector::{
    ConnectOutcome, Connector, ConnectorBuilder, DEFAULT_MESSAGE, DEFAULT_RETRY_BACKOFF,
    DEFAULT_RETRY_INTERVAL, DEFAULT_TIMEOUT, Exchange, Mode, Sequencing, Step,
    resolve_pending_connect_error,
};
pub use error::{Error, Result};
pub use sys::RawFd;
