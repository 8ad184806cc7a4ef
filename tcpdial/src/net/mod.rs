//! TCP client networking primitives.
//!
//! This module provides the building blocks the connector is made of:
//! - [`Endpoint`]: the IPv4 host and port to dial,
//! - [`Socket`]: an owned descriptor closed exactly once,
//! - [`NonBlocking`]: a scoped non-blocking mode guard,
//! - [`Connection`]: the connected byte channel handed to the caller.

mod connection;
mod endpoint;
mod socket;

pub use connection::{Connection, READ_BUFFER_SIZE, Wake};
pub use endpoint::{DEFAULT_HOST, DEFAULT_PORT, Endpoint};
pub use socket::{NonBlocking, Socket};
