use super::Connector;
use crate::error::Result;
use crate::net::{Connection, Wake};
use crate::wait::Readiness;

use tracing::warn;

/// Payload sent when none is configured.
pub const DEFAULT_MESSAGE: &[u8] = b"this is a message\n\n";

/// Order in which a session performs its write and read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sequencing {
    /// After any successful connect: restore blocking mode, write the
    /// whole payload, then read once.
    #[default]
    Unified,

    /// Treat the wake bits of a non-blocking connect as independently
    /// actionable: read only if input readiness fired (while still
    /// non-blocking), write only if output readiness fired. A connect
    /// that completed without a wait performs neither half.
    ///
    /// Blocking connects always use [`Sequencing::Unified`].
    PerWake,
}

/// One half of an exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step<T> {
    Done(T),

    /// The half was skipped because its readiness bit did not fire.
    NotReady,
}

impl<T> Step<T> {
    pub fn done(self) -> Option<T> {
        match self {
            Step::Done(value) => Some(value),
            Step::NotReady => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }
}

/// What a session exchanged with the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    /// Bytes written.
    pub sent: Step<usize>,

    /// Bytes returned by the single read.
    pub received: Step<Vec<u8>>,
}

impl Connection {
    /// Sends `payload` and reads the response once.
    ///
    /// # Errors
    ///
    /// Any write or read failure ends the exchange; the connection is
    /// left open for the caller to close.
    pub fn exchange(&mut self, payload: &[u8], sequencing: Sequencing) -> Result<Exchange> {
        match (sequencing, self.wake()) {
            (Sequencing::PerWake, Wake::Fired(readiness)) => {
                self.exchange_per_wake(payload, readiness)
            }

            (Sequencing::PerWake, Wake::Immediate) => {
                warn!("socket not ready to read");
                warn!("socket not ready to write");

                Ok(Exchange {
                    sent: Step::NotReady,
                    received: Step::NotReady,
                })
            }

            _ => {
                self.restore_blocking()?;

                let sent = self.write_all(payload)?;
                let received = self.read_once()?;

                Ok(Exchange {
                    sent: Step::Done(sent),
                    received: Step::Done(received),
                })
            }
        }
    }

    fn exchange_per_wake(&mut self, payload: &[u8], readiness: Readiness) -> Result<Exchange> {
        let received = if readiness.readable {
            Step::Done(self.read_once()?)
        } else {
            warn!("socket not ready to read");
            Step::NotReady
        };

        let sent = if readiness.writable {
            self.restore_blocking()?;
            Step::Done(self.write_all(payload)?)
        } else {
            warn!("socket not ready to write");
            Step::NotReady
        };

        Ok(Exchange { sent, received })
    }
}

impl Connector {
    /// Connects, exchanges `payload` once, and closes.
    ///
    /// The socket is closed on every path. A failing close is logged
    /// and does not change the result.
    pub fn exchange(&self, payload: &[u8]) -> Result<Exchange> {
        let mut connection = self.connect().into_result()?;

        let result = connection.exchange(payload, self.sequencing());

        if let Err(e) = connection.close() {
            warn!(error = %e, "socket close failed");
        }

        result
    }
}
