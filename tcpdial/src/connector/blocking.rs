use crate::error::{Error, Result};
use crate::net::{Connection, Endpoint, Socket, Wake};

use tracing::{debug, info};

/// Connects with a plain blocking `connect`.
///
/// No timeout is imposed; the operating system's handshake limits apply.
pub(crate) fn connect(endpoint: Endpoint) -> Result<Connection> {
    let socket = Socket::new()?;

    debug!("connecting");
    socket
        .connect(&endpoint.socket_addr())
        .map_err(|source| Error::Connect { endpoint, source })?;

    info!("connected");
    Ok(Connection::new(socket, endpoint, Wake::Blocking, None))
}
