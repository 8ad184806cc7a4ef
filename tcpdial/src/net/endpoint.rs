use crate::error::{Error, Result};

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

/// Host used when none is configured.
pub const DEFAULT_HOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8649;

/// An IPv4 host and port to connect to.
///
/// The host is always a literal dotted-quad address; no name
/// resolution is ever performed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    addr: SocketAddrV4,
}

impl Endpoint {
    /// Creates an endpoint from an already parsed address.
    pub const fn new(host: Ipv4Addr, port: u16) -> Self {
        Self {
            addr: SocketAddrV4::new(host, port),
        }
    }

    /// Parses `host` as a dotted-quad IPv4 address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Address`] if `host` is a name, an IPv6 address
    /// or otherwise not four decimal octets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tcpdial::net::Endpoint;
    ///
    /// let endpoint = Endpoint::parse("127.0.0.1", 8649).unwrap();
    /// assert_eq!(endpoint.to_string(), "127.0.0.1:8649");
    ///
    /// assert!(Endpoint::parse("localhost", 8649).is_err());
    /// ```
    pub fn parse(host: &str, port: u16) -> Result<Self> {
        let ip = Ipv4Addr::from_str(host).map_err(|_| Error::Address {
            input: host.to_string(),
            reason: "host is not a dotted-quad IPv4 address",
        })?;

        Ok(Self::new(ip, port))
    }

    pub fn host(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        self.addr
    }
}

impl Default for Endpoint {
    /// `127.0.0.1:8649`.
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self { addr }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Parses `"a.b.c.d:port"`.
    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s.rsplit_once(':').ok_or_else(|| Error::Address {
            input: s.to_string(),
            reason: "expected `host:port`",
        })?;

        let port = port.parse::<u16>().map_err(|_| Error::Address {
            input: s.to_string(),
            reason: "port is not a number in 0..=65535",
        })?;

        Self::parse(host, port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host(), self.port())
    }
}
