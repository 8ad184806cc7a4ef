#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use tcpdial::net::Endpoint;

pub const MESSAGE: &[u8] = b"this is a message\n\n";

/// Returns the IPv4 endpoint a listener is bound to.
pub fn endpoint_of(listener: &TcpListener) -> Endpoint {
    match listener.local_addr().expect("Failed to get local address") {
        SocketAddr::V4(addr) => Endpoint::from(addr),
        SocketAddr::V6(_) => panic!("listener is not bound to IPv4"),
    }
}

/// Spawns a peer that accepts `connections` clients, reads once from
/// each and writes back exactly what it read.
pub fn echo_server(connections: usize) -> (Endpoint, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let endpoint = endpoint_of(&listener);

    let handle = thread::spawn(move || {
        for _ in 0..connections {
            let (mut stream, _) = listener.accept().expect("Failed to accept connection");
            let mut buffer = [0u8; 1024];

            let n = stream.read(&mut buffer).unwrap_or(0);
            if n > 0 {
                let _ = stream.write_all(&buffer[..n]);
            }
        }
    });

    (endpoint, handle)
}

/// Returns an endpoint nothing listens on.
pub fn refused_endpoint() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    endpoint_of(&listener)
}

/// Binds a listener whose accept queue is already shrunk to its
/// minimum, so handshakes stall once it fills up.
#[cfg(target_os = "linux")]
pub fn saturated_listener() -> TcpListener {
    use std::os::fd::AsRawFd;

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let rc = unsafe { libc::listen(listener.as_raw_fd(), 0) };
    assert_eq!(rc, 0, "Failed to shrink the listen backlog");

    listener
}
