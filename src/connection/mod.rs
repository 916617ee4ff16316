//! Client connections
//!
//! Each accepted socket is served by its own [`ConnectionHandler`] task.
//! Handlers share nothing with each other except the storage behind their
//! [`CommandHandler`](crate::commands::CommandHandler).
//!
//! ```text
//!   bytes in ──> Codec::decode ──> CommandHandler::execute
//!                                          │
//!   bytes out <── Codec::encode <──────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use fluxdb::commands::CommandHandler;
//! use fluxdb::connection::handle_connection;
//! use fluxdb::protocol::Protocol;
//! use fluxdb::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let handler = CommandHandler::new(Arc::new(StorageEngine::new()));
//!
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, handler.clone(), Protocol::Resp));
//! ```

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler};
