//! Command-line front end for the connector.
//!
//! Connects to an endpoint, sends one message, reads the response once
//! and closes. Milestones go to stdout, failures to stderr. Exits with
//! `0` on success and `1` on any failure.
//!
//! # Examples
//!
//! ```bash
//! # Default: poll mode against 127.0.0.1:8649
//! tcpdial
//!
//! # Select mode with a two second bound and three retries
//! tcpdial --host 10.0.0.7 --port 7000 --mode select --timeout-ms 2000 --retries 3
//!
//! # Reproduce the per-wake read/write split of the poll variant
//! tcpdial --mode poll --per-wake
//! ```

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tcpdial::net::{DEFAULT_PORT, Endpoint};
use tcpdial::{
    Connector, DEFAULT_MESSAGE, DEFAULT_RETRY_BACKOFF, Error, Mode, Sequencing, Step,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tcpdial")]
#[command(about = "Connect to a TCP endpoint, send one message and read the reply")]
struct Args {
    /// IPv4 address to connect to (no name resolution)
    #[arg(long, env = "TCPDIAL_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to connect to
    #[arg(long, short, env = "TCPDIAL_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Connect strategy: blocking, select or poll
    #[arg(long, short, env = "TCPDIAL_MODE", default_value = "poll")]
    mode: Mode,

    /// Bound on the readiness wait in milliseconds (ignored when blocking)
    #[arg(long, env = "TCPDIAL_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    /// Extra attempts after a transient connect failure
    #[arg(long, default_value_t = 0)]
    retries: usize,

    /// Delay before the first retry in milliseconds
    #[arg(long, default_value_t = 100)]
    retry_interval_ms: u64,

    /// Factor the retry delay grows by after each attempt
    #[arg(
        long,
        default_value_t = DEFAULT_RETRY_BACKOFF,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    retry_backoff: u32,

    /// Act on the individual wake bits instead of always writing then reading
    #[arg(long)]
    per_wake: bool,

    /// Message to send instead of the default one
    #[arg(long)]
    message: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> tcpdial::Result<()> {
    let endpoint = Endpoint::parse(&args.host, args.port)?;

    let sequencing = if args.per_wake {
        Sequencing::PerWake
    } else {
        Sequencing::Unified
    };

    let connector = Connector::builder()
        .endpoint(endpoint)
        .mode(args.mode)
        .timeout(Duration::from_millis(args.timeout_ms))
        .sequencing(sequencing)
        .retries(args.retries)
        .retry_interval(Duration::from_millis(args.retry_interval_ms))
        .retry_backoff(args.retry_backoff)
        .build();

    let payload = args
        .message
        .map(String::into_bytes)
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_vec());

    let outcome = connector.connect().into_result();
    if !matches!(outcome, Err(Error::Socket(_))) {
        println!("socket created");
    }

    let mut connection = outcome?;
    println!("Connected to {}", connection.peer());

    let result = connection.exchange(&payload, sequencing);

    if let Ok(exchange) = &result {
        match &exchange.sent {
            Step::Done(n) => println!("sent {n} bytes ok!"),
            Step::NotReady => eprintln!("socket not ready to write"),
        }

        match &exchange.received {
            Step::Done(bytes) => println!(
                "read {} bytes = {}",
                bytes.len(),
                String::from_utf8_lossy(bytes)
            ),
            Step::NotReady => eprintln!("socket not ready to read"),
        }
    }

    match connection.close() {
        Ok(()) => println!("socket close OK"),
        Err(e) => eprintln!("socket close failed: {e}"),
    }

    result.map(drop)
}
