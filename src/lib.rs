//! # FluxDB - A Minimal In-Memory Key-Value Server
//!
//! FluxDB keeps string keys and values in memory and serves them over TCP
//! using RESP frames (or a plain newline-delimited protocol for simple
//! clients). It also exposes a small runtime configuration namespace.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                               FluxDB                               │
//! │                                                                    │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐             │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │             │
//! │  │ (server.rs) │    │  Handler    │    │  Handler    │             │
//! │  └─────────────┘    └──────┬──────┘    └──────┬──────┘             │
//! │                            │                  │                    │
//! │                            ▼                  ▼                    │
//! │                     ┌─────────────┐    ┌───────────────────────┐   │
//! │                     │   Codec     │    │     StorageEngine     │   │
//! │                     │ RESP | line │    │  keys     │  config   │   │
//! │                     └─────────────┘    │  RwLock   │  RwLock   │   │
//! │                                        └───────────────────────┘   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use fluxdb::commands::CommandHandler;
//! use fluxdb::protocol::Protocol;
//! use fluxdb::storage::StorageEngine;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let storage = Arc::new(StorageEngine::new());
//!     let listener = TcpListener::bind(fluxdb::server::listen_address(&storage)).await?;
//!
//!     fluxdb::server::run(listener, CommandHandler::new(storage), Protocol::Resp).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `PING [message]`
//! - `SET key value`
//! - `GET key`
//! - `DEL key [key ...]`
//! - `CONFIG GET pattern` / `CONFIG SET name value`
//! - `SELECT index`
//! - `HELP`
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP and line codecs, reply frames
//! - [`commands`]: command table and execution
//! - [`storage`]: the key space and the config store
//! - [`connection`]: per-client read/dispatch/reply loop
//! - [`server`]: accept loop

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

pub use commands::CommandHandler;
pub use connection::handle_connection;
pub use protocol::{Codec, ParseError, Protocol, RespParser, RespValue};
pub use storage::StorageEngine;

/// The default port FluxDB listens on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default address FluxDB binds to
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Version of FluxDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
