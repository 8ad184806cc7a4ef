mod common;

use common::refused_endpoint;
use std::cell::Cell;
use std::time::{Duration, Instant};
use tcpdial::tools::retry;
use tcpdial::{ConnectOutcome, Connector, Mode};

#[test]
fn test_retry_succeeds_before_limit() {
    let attempts = Cell::new(0);

    let result = retry(5, || {
        let n = attempts.get();
        attempts.set(n + 1);

        if n < 2 { Err("fail") } else { Ok(42) }
    })
    .run();

    assert_eq!(result, Ok(42), "Retry should succeed before limit");
    assert_eq!(attempts.get(), 3, "Should have retried 3 times");
}

#[test]
fn test_retry_fails_after_limit() {
    let attempts = Cell::new(0);

    let result: Result<(), _> = retry(3, || {
        attempts.set(attempts.get() + 1);
        Err("fail")
    })
    .run();

    assert_eq!(result, Err("fail"), "Retry should fail after limit");
    assert_eq!(attempts.get(), 4, "Should have made 4 attempts");
}

#[test]
fn test_retry_zero_times_runs_once() {
    let attempts = Cell::new(0);

    let result: Result<(), _> = retry(0, || {
        attempts.set(attempts.get() + 1);
        Err("fail")
    })
    .run();

    assert!(result.is_err());
    assert_eq!(attempts.get(), 1, "Zero retries means a single attempt");
}

#[test]
fn test_retry_with_interval() {
    let interval = Duration::from_millis(20);
    let last = Cell::new(None::<Instant>);
    let attempts = Cell::new(0);

    let result = retry(3, || {
        let now = Instant::now();

        if let Some(prev) = last.get() {
            let elapsed = now.duration_since(prev);
            assert!(
                elapsed >= interval,
                "Interval between attempts too short: {:?}",
                elapsed
            );
        }
        last.set(Some(now));

        let n = attempts.get();
        attempts.set(n + 1);

        if n < 2 { Err("fail") } else { Ok(77) }
    })
    .set_interval(interval)
    .run();

    assert_eq!(result, Ok(77), "Retry with interval should succeed");
    assert_eq!(attempts.get(), 3);
}

#[test]
fn test_retry_backoff_grows_delay() {
    let interval = Duration::from_millis(10);
    let start = Instant::now();

    let result: Result<(), _> = retry(3, || Err("fail"))
        .set_interval(interval)
        .set_backoff(2)
        .run();

    // 10 + 20 + 40 ms of sleeping between four attempts.
    assert!(result.is_err());
    assert!(
        start.elapsed() >= Duration::from_millis(70),
        "Backoff should double the delay each time, took {:?}",
        start.elapsed()
    );
}

#[test]
fn test_retry_stops_on_rejected_error() {
    let attempts = Cell::new(0);

    let result: Result<(), _> = retry(5, || {
        attempts.set(attempts.get() + 1);
        Err("fatal")
    })
    .when(|e: &&str| *e != "fatal")
    .run();

    assert_eq!(result, Err("fatal"));
    assert_eq!(attempts.get(), 1, "A rejected error should not be retried");
}

#[test]
fn test_connector_retries_refused_connect() {
    let endpoint = refused_endpoint();
    let interval = Duration::from_millis(10);

    for mode in [Mode::Blocking, Mode::Select, Mode::Poll] {
        let connector = Connector::builder()
            .endpoint(endpoint)
            .mode(mode)
            .retries(2)
            .retry_interval(interval)
            .retry_backoff(2)
            .build();

        let start = Instant::now();
        let outcome = connector.connect();

        assert!(
            matches!(outcome, ConnectOutcome::Failed(_)),
            "{mode} should still fail after retries"
        );
        // Two retries: 10 ms then 20 ms of backoff.
        assert!(
            start.elapsed() >= Duration::from_millis(30),
            "{mode} should have waited between attempts, took {:?}",
            start.elapsed()
        );
    }
}
