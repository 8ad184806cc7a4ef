use super::{Connector, Mode, Sequencing};
use crate::net::Endpoint;
use crate::wait::ReadinessWait;

use std::time::Duration;

/// Bound on the readiness wait of the non-blocking modes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay before the first retry.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Factor applied to the retry delay after each failed attempt.
pub const DEFAULT_RETRY_BACKOFF: u32 = 2;

/// Builder for configuring and creating a [`Connector`].
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use tcpdial::{ConnectorBuilder, Mode};
/// use tcpdial::net::Endpoint;
///
/// let connector = ConnectorBuilder::new()
///     .endpoint(Endpoint::parse("127.0.0.1", 8649).unwrap())
///     .mode(Mode::Select)
///     .timeout(Duration::from_secs(2))
///     .retries(3)
///     .build();
///
/// assert_eq!(connector.mode(), Mode::Select);
/// ```
#[derive(Clone, Debug)]
pub struct ConnectorBuilder {
    endpoint: Endpoint,
    mode: Mode,
    timeout: Duration,
    sequencing: Sequencing,
    retries: usize,
    retry_interval: Duration,
    retry_backoff: u32,
    waiter: Option<&'static dyn ReadinessWait>,
}

impl ConnectorBuilder {
    /// Creates a builder with the default configuration:
    /// `127.0.0.1:8649`, poll mode, five second timeout, no retries.
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::default(),
            mode: Mode::default(),
            timeout: DEFAULT_TIMEOUT,
            sequencing: Sequencing::default(),
            retries: 0,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            waiter: None,
        }
    }

    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the bound on the readiness wait. Ignored in blocking mode.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn sequencing(mut self, sequencing: Sequencing) -> Self {
        self.sequencing = sequencing;
        self
    }

    /// Number of extra attempts after a transient failure.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Sets the factor the retry delay grows by after each attempt.
    ///
    /// # Panics
    ///
    /// Panics if `factor == 0`.
    pub fn retry_backoff(mut self, factor: u32) -> Self {
        assert!(factor > 0, "retry_backoff must be > 0");

        self.retry_backoff = factor;
        self
    }

    /// Replaces the wait backend the mode would pick.
    ///
    /// Ignored in blocking mode.
    pub fn waiter(mut self, waiter: &'static dyn ReadinessWait) -> Self {
        self.waiter = Some(waiter);
        self
    }

    /// Builds the connector with the configured options.
    pub fn build(self) -> Connector {
        Connector {
            endpoint: self.endpoint,
            mode: self.mode,
            timeout: self.timeout,
            sequencing: self.sequencing,
            retries: self.retries,
            retry_interval: self.retry_interval,
            retry_backoff: self.retry_backoff,
            waiter: self.waiter,
        }
    }
}

impl Default for ConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
