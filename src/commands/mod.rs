//! Command dispatch
//!
//! ```text
//!   [verb, arg, ...]
//!         │
//!         ▼
//! ┌─────────────────┐
//! │  CommandTable   │  verb (+ subcommand) lookup, arity check
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  runs the command, builds the reply
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `PING [message]`, `HELP`, `SELECT index`
//! - `SET key value`, `GET key`, `DEL key [key ...]`
//! - `CONFIG GET pattern`, `CONFIG SET name value`
//!
//! Verbs and subcommands are case-insensitive. Keys, values and config names
//! are not.

pub mod handler;
pub mod table;

pub use handler::CommandHandler;
pub use table::{Arity, CommandSpec, CommandTable, DispatchError};
