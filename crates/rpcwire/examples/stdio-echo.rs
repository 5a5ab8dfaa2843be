//! Echo server over stdin/stdout — sends every received message back.
//!
//! Run with:
//!   printf 'Content-Length: 2\r\n\r\n{}' | cargo run --example stdio-echo
//!
//! Set `RUST_LOG=debug` to see framing events on stderr.

use rpcwire::transport::stdio;
use rpcwire::{Connection, FrameError, Incoming};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries protocol bytes; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_target(false)
        .init();

    let conn = Connection::new(stdio());

    loop {
        match conn.receive::<Value>() {
            Ok(message) => {
                let count = match &message {
                    Incoming::Single(_) => 1,
                    Incoming::Batch(batch) => batch.len(),
                };
                info!(count, "echoing message");
                conn.send(&message)?;
            }
            Err(FrameError::ConnectionLost) => {
                info!("peer closed the stream");
                return Ok(());
            }
            Err(err) if err.is_recoverable() => warn!(error = %err, "skipping message"),
            Err(err) => return Err(err.into()),
        }
    }
}
