//! TCP accept loop
//!
//! Binds nothing itself: the caller owns the listener, which keeps address
//! selection (and ephemeral ports in tests) outside the loop.

use crate::commands::CommandHandler;
use crate::connection::handle_connection;
use crate::protocol::Protocol;
use crate::storage::StorageEngine;
use crate::{DEFAULT_BIND, DEFAULT_PORT};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Accepts connections forever, serving each on its own task.
///
/// A failed `accept` is logged and the loop continues; only the caller can
/// stop it, by dropping the future.
pub async fn run(listener: TcpListener, handler: CommandHandler, protocol: Protocol) {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, protocol = %protocol, "Listening for connections");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let handler = handler.clone();
                tokio::spawn(handle_connection(stream, addr, handler, protocol));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// The `bind:port` address to listen on, read from the config store.
///
/// Falls back to the defaults for entries that have been removed.
pub fn listen_address(storage: &StorageEngine) -> String {
    let bind = storage
        .get_config("bind")
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let port = storage
        .get_config("port")
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    format!("{}:{}", bind, port)
}
