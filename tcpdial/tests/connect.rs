mod common;

use common::{MESSAGE, echo_server, refused_endpoint};
use std::io;
use tcpdial::net::{Endpoint, Socket, Wake};
use tcpdial::{
    ConnectOutcome, Connector, Error, Mode, Sequencing, Step, resolve_pending_connect_error,
};

const MODES: [Mode; 3] = [Mode::Blocking, Mode::Select, Mode::Poll];

fn assert_echoed(mode: Mode) {
    let (endpoint, handle) = echo_server(1);
    let connector = Connector::new(endpoint, mode);

    let exchange = connector
        .exchange(MESSAGE)
        .unwrap_or_else(|e| panic!("{mode} exchange failed: {e}"));

    assert_eq!(
        exchange.sent,
        Step::Done(MESSAGE.len()),
        "{mode} should send the whole payload"
    );
    assert_eq!(
        exchange.received,
        Step::Done(MESSAGE.to_vec()),
        "{mode} should read back the payload verbatim"
    );

    handle.join().expect("Thread panicked");
}

#[test]
fn test_blocking_connect_round_trip() {
    assert_echoed(Mode::Blocking);
}

#[test]
fn test_select_connect_round_trip() {
    assert_echoed(Mode::Select);
}

#[test]
fn test_poll_connect_round_trip() {
    assert_echoed(Mode::Poll);
}

#[test]
fn test_all_modes_exchange_same_bytes() {
    let mut responses = Vec::new();

    for mode in MODES {
        let (endpoint, handle) = echo_server(1);
        let exchange = Connector::new(endpoint, mode)
            .exchange(b"ping")
            .expect("Exchange failed");

        responses.push(exchange.received.done().expect("Read should have happened"));
        handle.join().expect("Thread panicked");
    }

    assert!(
        responses.iter().all(|r| r == b"ping"),
        "All modes should converge on the same response: {responses:?}"
    );
}

#[test]
fn test_connected_outcome_reports_peer_and_mode() {
    for mode in MODES {
        let (endpoint, handle) = echo_server(1);

        let outcome = Connector::new(endpoint, mode).connect();
        assert!(outcome.is_connected(), "{mode} should connect");

        let connection = outcome.into_result().expect("Should be connected");
        assert_eq!(connection.peer(), endpoint);
        assert!(
            !connection.is_nonblocking(),
            "{mode} should hand back a blocking socket"
        );

        match (mode, connection.wake()) {
            (Mode::Blocking, Wake::Blocking) => {}
            (Mode::Blocking, other) => panic!("blocking connect reported {other:?}"),
            (_, Wake::Blocking) => panic!("{mode} reported a blocking wake"),
            _ => {}
        }

        connection.close().expect("Close should succeed");
        handle.join().expect("Thread panicked");
    }
}

#[test]
fn test_refused_port_fails_in_every_mode() {
    let endpoint = refused_endpoint();

    for mode in MODES {
        match Connector::new(endpoint, mode).connect() {
            ConnectOutcome::Failed(e) => assert_eq!(
                e.kind(),
                Some(io::ErrorKind::ConnectionRefused),
                "{mode} should report connection refused, got {e}"
            ),
            ConnectOutcome::Connected(_) => panic!("{mode} connected to a closed port"),
            ConnectOutcome::TimedOut { .. } => panic!("{mode} timed out on a closed port"),
        }
    }
}

#[cfg(unix)]
#[test]
fn test_refused_reason_is_the_os_code() {
    let endpoint = refused_endpoint();

    for mode in [Mode::Select, Mode::Poll] {
        let err = Connector::new(endpoint, mode)
            .try_connect()
            .expect_err("Connect to a closed port should fail");

        assert_eq!(
            err.os_code(),
            Some(libc::ECONNREFUSED),
            "{mode} should surface ECONNREFUSED, got {err:?}"
        );
        assert!(
            matches!(err, Error::Deferred { .. } | Error::Connect { .. }),
            "{mode} should fail in connect or deferred resolution, got {err:?}"
        );
    }
}

#[test]
fn test_resolve_pending_error_on_fresh_socket() {
    let socket = Socket::new().expect("Failed to allocate socket");

    let result = resolve_pending_connect_error(&socket, Endpoint::default());
    assert!(result.is_ok(), "A fresh socket has no deferred error");

    socket.close().expect("Close should succeed");
}

#[test]
fn test_unified_sequencing_is_default() {
    let connector = Connector::new(Endpoint::default(), Mode::Poll);

    assert_eq!(connector.sequencing(), Sequencing::Unified);
    assert_eq!(connector.timeout(), tcpdial::DEFAULT_TIMEOUT);
    assert_eq!(connector.retries(), 0);
}
