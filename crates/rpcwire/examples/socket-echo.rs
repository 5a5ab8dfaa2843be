//! Unix socket round trip — a server thread echoes one request to a client.
//!
//! Run with:
//!   cargo run --example socket-echo

use std::fs;
use std::time::Duration;

use rpcwire::transport::UnixDomainSocket;
use rpcwire::{Connection, FrameConfig, Incoming};
use serde_json::{json, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let sock_dir = std::env::temp_dir().join(format!("rpcwire-echo-{}", std::process::id()));
    fs::create_dir_all(&sock_dir)?;
    let sock_path = sock_dir.join("echo.sock");

    let listener = UnixDomainSocket::bind(&sock_path)?;
    let server = std::thread::spawn(move || -> Result<(), rpcwire::FrameError> {
        let conn = Connection::new(listener.accept()?.into_channel()?);
        let request: Incoming<Value> = conn.receive()?;
        conn.send(&request)
    });

    let config = FrameConfig {
        read_timeout: Some(Duration::from_secs(5)),
        write_timeout: Some(Duration::from_secs(5)),
        ..FrameConfig::default()
    };
    let client = Connection::with_config_socket(UnixDomainSocket::connect(&sock_path)?, config)?;

    client.send_batch(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "initialized", "params": {}}),
    ])?;
    let reply: Incoming<Value> = client.receive()?;
    eprintln!("echoed back: {}", serde_json::to_string(&reply)?);

    server.join().map_err(|_| "server thread panicked")??;
    let _ = fs::remove_dir_all(&sock_dir);
    Ok(())
}
