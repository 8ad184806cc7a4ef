mod common;

use common::{MESSAGE, echo_server};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;
use tcpdial::RawFd;
use tcpdial::net::Wake;
use tcpdial::wait::{Interest, PollWait, Readiness, ReadinessWait};
use tcpdial::{Connector, Error, Mode, Sequencing, Step};

/// Poll backend that only reports once the peer's data has arrived.
#[derive(Debug)]
struct AfterPeerSpeaks;

impl ReadinessWait for AfterPeerSpeaks {
    fn name(&self) -> &'static str {
        "after-peer-speaks"
    }

    fn wait_once(
        &self,
        fd: RawFd,
        interest: Interest,
        timeout: Duration,
    ) -> std::io::Result<Option<Readiness>> {
        if PollWait.wait(fd, Interest::READ, timeout)?.is_none() {
            return Ok(None);
        }

        PollWait.wait_once(fd, interest, Duration::ZERO)
    }
}

fn per_wake(mode: Mode, endpoint: tcpdial::net::Endpoint) -> Connector {
    Connector::builder()
        .endpoint(endpoint)
        .mode(mode)
        .sequencing(Sequencing::PerWake)
        .build()
}

#[test]
fn test_per_wake_only_performs_fired_halves() {
    for mode in [Mode::Select, Mode::Poll] {
        let (endpoint, handle) = echo_server(1);

        let mut connection = per_wake(mode, endpoint)
            .connect()
            .into_result()
            .expect("Connect should succeed");

        let wake = connection.wake();
        let exchange = connection
            .exchange(MESSAGE, Sequencing::PerWake)
            .expect("Exchange should not fail");

        match wake {
            Wake::Fired(readiness) => {
                assert_eq!(
                    exchange.sent.is_done(),
                    readiness.writable,
                    "{mode}: write must happen exactly when output readiness fired"
                );
                assert_eq!(
                    exchange.received.is_done(),
                    readiness.readable,
                    "{mode}: read must happen exactly when input readiness fired"
                );
            }
            Wake::Immediate => {
                assert_eq!(exchange.sent, Step::NotReady);
                assert_eq!(exchange.received, Step::NotReady);
            }
            Wake::Blocking => panic!("{mode} reported a blocking wake"),
        }

        if let Step::Done(n) = exchange.sent {
            assert_eq!(n, MESSAGE.len());
        }

        connection.close().expect("Close should succeed");
        handle.join().expect("Thread panicked");
    }
}

#[test]
fn test_per_wake_reads_when_peer_spoke_first() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let endpoint = common::endpoint_of(&listener);

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept connection");
        stream
            .write_all(b"greeting")
            .expect("Failed to write to stream");

        let mut buffer = vec![0u8; MESSAGE.len()];
        stream
            .read_exact(&mut buffer)
            .expect("Failed to read from stream");
        buffer
    });

    let mut connection = Connector::builder()
        .endpoint(endpoint)
        .mode(Mode::Poll)
        .sequencing(Sequencing::PerWake)
        .waiter(&AfterPeerSpeaks)
        .build()
        .connect()
        .into_result()
        .expect("Connect should succeed");

    match connection.wake() {
        Wake::Fired(readiness) => {
            assert!(readiness.readable, "Peer data should raise input readiness");
            assert!(readiness.writable, "Connected socket should be writable");
        }
        other => panic!("Expected a fired wake, got {other:?}"),
    }
    assert!(connection.is_nonblocking());

    let exchange = connection
        .exchange(MESSAGE, Sequencing::PerWake)
        .expect("Exchange should not fail");

    assert_eq!(exchange.received, Step::Done(b"greeting".to_vec()));
    assert_eq!(exchange.sent, Step::Done(MESSAGE.len()));
    assert!(
        !connection.is_nonblocking(),
        "The write half should restore blocking mode"
    );

    connection.close().expect("Close should succeed");
    let delivered = handle.join().expect("Thread panicked");
    assert_eq!(delivered, MESSAGE);
}

#[test]
fn test_custom_waiter_is_ignored_when_blocking() {
    let connector = Connector::builder()
        .mode(Mode::Blocking)
        .waiter(&AfterPeerSpeaks)
        .build();

    assert!(connector.waiter().is_none());
}

#[test]
fn test_per_wake_keeps_socket_nonblocking_until_write() {
    let (endpoint, handle) = echo_server(1);

    let connection = per_wake(Mode::Poll, endpoint)
        .connect()
        .into_result()
        .expect("Connect should succeed");

    assert!(
        connection.is_nonblocking(),
        "Per-wake sequencing defers restoring blocking mode"
    );

    drop(connection);
    handle.join().expect("Thread panicked");
}

#[test]
fn test_per_wake_with_blocking_mode_is_unified() {
    let (endpoint, handle) = echo_server(1);

    let exchange = per_wake(Mode::Blocking, endpoint)
        .exchange(MESSAGE)
        .expect("Exchange should succeed");

    assert_eq!(exchange.sent, Step::Done(MESSAGE.len()));
    assert_eq!(exchange.received, Step::Done(MESSAGE.to_vec()));

    handle.join().expect("Thread panicked");
}

#[test]
fn test_unified_restores_blocking_before_write() {
    let (endpoint, handle) = echo_server(1);

    let mut connection = Connector::new(endpoint, Mode::Select)
        .connect()
        .into_result()
        .expect("Connect should succeed");

    let exchange = connection
        .exchange(b"hello", Sequencing::Unified)
        .expect("Exchange should succeed");

    assert!(!connection.is_nonblocking());
    assert_eq!(exchange.sent, Step::Done(5));
    assert_eq!(exchange.received, Step::Done(b"hello".to_vec()));

    connection.close().expect("Close should succeed");
    handle.join().expect("Thread panicked");
}

#[test]
fn test_read_once_takes_at_most_one_buffer() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let endpoint = common::endpoint_of(&listener);

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept connection");
        let mut buffer = [0u8; 4];
        stream
            .read_exact(&mut buffer)
            .expect("Failed to read from stream");
        // The client closes after one read; the rest may be reset.
        let _ = stream.write_all(&[b'x'; 4096]);
    });

    let exchange = Connector::new(endpoint, Mode::Poll)
        .exchange(b"more")
        .expect("Exchange should succeed");

    let received = exchange.received.done().expect("Read should have happened");
    assert!(!received.is_empty());
    assert!(
        received.len() <= tcpdial::net::READ_BUFFER_SIZE,
        "A single read must not exceed the buffer, got {}",
        received.len()
    );

    handle.join().expect("Thread panicked");
}

#[test]
fn test_write_reports_full_length() {
    let (endpoint, handle) = echo_server(1);

    let mut connection = Connector::new(endpoint, Mode::Blocking)
        .connect()
        .into_result()
        .expect("Connect should succeed");

    let n = connection.write(MESSAGE).expect("Write should succeed");
    assert_eq!(n, MESSAGE.len());

    let echoed = connection.read_once().expect("Read should succeed");
    assert_eq!(echoed, MESSAGE);

    connection.close().expect("Close should succeed");
    handle.join().expect("Thread panicked");
}

#[test]
fn test_timeout_error_kind() {
    let err = Error::Timeout {
        endpoint: tcpdial::net::Endpoint::default(),
        timeout: tcpdial::DEFAULT_TIMEOUT,
    };

    assert!(err.is_timeout());
    assert_eq!(err.kind(), Some(std::io::ErrorKind::TimedOut));
    assert_eq!(err.os_code(), None);
}
