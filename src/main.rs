//! FluxDB server binary
//!
//! Seeds the configuration store, binds the listener and serves clients
//! until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use fluxdb::commands::CommandHandler;
use fluxdb::protocol::Protocol;
use fluxdb::server;
use fluxdb::storage::StorageEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// FluxDB - a minimal in-memory key-value server
#[derive(Parser, Debug)]
#[command(name = "fluxdb")]
#[command(version)]
struct Args {
    /// Address to bind to [default: 0.0.0.0]
    #[arg(short, long, env = "FLUXDB_BIND")]
    bind: Option<String>,

    /// Port to listen on [default: 6379]
    #[arg(short, long, env = "FLUXDB_PORT")]
    port: Option<u16>,

    /// Wire protocol: `resp`, or `line` for newline-delimited clients
    #[arg(long, default_value_t = Protocol::Resp)]
    protocol: Protocol,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let storage = Arc::new(StorageEngine::new());
    if let Some(bind) = args.bind {
        storage.set_config("bind", bind);
    }
    if let Some(port) = args.port {
        storage.set_config("port", port.to_string());
    }

    let address = server::listen_address(&storage);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to listen on {}", address))?;

    info!("FluxDB v{} started", fluxdb::VERSION);

    let handler = CommandHandler::new(storage);

    tokio::select! {
        _ = server::run(listener, handler, args.protocol) => {}
        _ = shutdown_signal() => {}
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping server..."),
        Err(e) => {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
