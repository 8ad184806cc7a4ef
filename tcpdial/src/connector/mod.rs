//! Establishing TCP client connections.
//!
//! A [`Connector`] dials one [`Endpoint`] using one of three
//! interchangeable strategies ([`Mode`]) and reports a terminal
//! [`ConnectOutcome`] per attempt:
//! - [`Mode::Blocking`]: plain blocking `connect`, no timeout,
//! - [`Mode::Select`]: non-blocking `connect` resolved with readiness sets,
//! - [`Mode::Poll`]: non-blocking `connect` resolved with an event descriptor.
//!
//! The non-blocking modes share one state machine and differ only in
//! the [`ReadinessWait`] backend they use.

mod blocking;
mod builder;
mod exchange;
mod nonblocking;

pub use builder::{
    ConnectorBuilder, DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_INTERVAL, DEFAULT_TIMEOUT,
};
pub use exchange::{DEFAULT_MESSAGE, Exchange, Sequencing, Step};
pub use nonblocking::resolve_pending_connect_error;

use crate::error::{Error, Result};
use crate::net::{Connection, Endpoint};
use crate::tools::retry;
use crate::wait::{PollWait, ReadinessWait, SelectWait};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info_span, warn};

/// Strategy used to complete the handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Blocking `connect`.
    Blocking,

    /// Non-blocking `connect` waited on with `select`.
    Select,

    /// Non-blocking `connect` waited on with `poll`.
    #[default]
    Poll,
}

impl Mode {
    /// Wait backend for this mode, `None` for [`Mode::Blocking`].
    pub fn waiter(&self) -> Option<&'static dyn ReadinessWait> {
        match self {
            Mode::Blocking => None,
            Mode::Select => Some(&SelectWait),
            Mode::Poll => Some(&PollWait),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Blocking => "blocking",
            Mode::Select => "select",
            Mode::Poll => "poll",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blocking" | "block" => Ok(Mode::Blocking),
            "select" => Ok(Mode::Select),
            "poll" => Ok(Mode::Poll),
            other => Err(format!(
                "unknown mode `{other}` (expected blocking, select or poll)"
            )),
        }
    }
}

/// Terminal result of a connection attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    Connected(Connection),

    /// The attempt failed; the error carries the reason.
    Failed(Error),

    /// Nothing became ready within the configured bound.
    TimedOut { endpoint: Endpoint, after: Duration },
}

impl ConnectOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectOutcome::Connected(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, ConnectOutcome::TimedOut { .. })
    }

    /// Converts the outcome back into a `Result`.
    ///
    /// A timeout becomes [`Error::Timeout`].
    pub fn into_result(self) -> Result<Connection> {
        match self {
            ConnectOutcome::Connected(connection) => Ok(connection),
            ConnectOutcome::Failed(error) => Err(error),
            ConnectOutcome::TimedOut { endpoint, after } => Err(Error::Timeout {
                endpoint,
                timeout: after,
            }),
        }
    }
}

impl From<Result<Connection>> for ConnectOutcome {
    fn from(result: Result<Connection>) -> Self {
        match result {
            Ok(connection) => ConnectOutcome::Connected(connection),
            Err(Error::Timeout { endpoint, timeout }) => ConnectOutcome::TimedOut {
                endpoint,
                after: timeout,
            },
            Err(error) => ConnectOutcome::Failed(error),
        }
    }
}

/// Dials a single endpoint with a fixed strategy.
///
/// A `Connector` holds configuration only; every call to
/// [`connect`](Self::connect) allocates a fresh socket.
///
/// # Examples
///
/// ```rust,no_run
/// use tcpdial::{Connector, Mode, DEFAULT_MESSAGE};
/// use tcpdial::net::Endpoint;
///
/// let connector = Connector::new(Endpoint::default(), Mode::Poll);
/// let exchange = connector.exchange(DEFAULT_MESSAGE)?;
/// println!("{:?}", exchange.received);
/// # Ok::<(), tcpdial::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Connector {
    endpoint: Endpoint,
    mode: Mode,
    timeout: Duration,
    sequencing: Sequencing,
    retries: usize,
    retry_interval: Duration,
    retry_backoff: u32,
    waiter: Option<&'static dyn ReadinessWait>,
}

impl Connector {
    /// Creates a connector with default timeout and no retries.
    pub fn new(endpoint: Endpoint, mode: Mode) -> Self {
        ConnectorBuilder::new().endpoint(endpoint).mode(mode).build()
    }

    pub fn builder() -> ConnectorBuilder {
        ConnectorBuilder::new()
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sequencing(&self) -> Sequencing {
        self.sequencing
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Wait backend used by the non-blocking modes, `None` when blocking.
    pub fn waiter(&self) -> Option<&'static dyn ReadinessWait> {
        let default = self.mode.waiter()?;
        Some(self.waiter.unwrap_or(default))
    }

    /// Performs a single connection attempt.
    pub fn try_connect(&self) -> Result<Connection> {
        let span = info_span!("connect", endpoint = %self.endpoint, mode = %self.mode);
        let _enter = span.enter();

        let result = match self.waiter() {
            None => blocking::connect(self.endpoint),
            Some(waiter) => {
                nonblocking::connect(self.endpoint, self.timeout, waiter, self.sequencing)
            }
        };

        if let Err(e) = &result {
            warn!(error = %e, "connect attempt failed");
        }

        result
    }

    /// Connects, retrying transient failures up to the configured limit.
    pub fn connect(&self) -> ConnectOutcome {
        retry(self.retries, || self.try_connect())
            .set_interval(self.retry_interval)
            .set_backoff(self.retry_backoff)
            .when(Error::is_transient)
            .run()
            .into()
    }
}
