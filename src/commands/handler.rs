//! Command Handler
//!
//! Turns a decoded command (verb + argument tokens) into a reply frame.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  resolve()  │───>│ arity check │───>│  cmd_*()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      StorageEngine          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A command that fails lookup or arity never reaches the store; the client
//! gets an error frame and the connection carries on.

use crate::commands::table::{Arity, CommandSpec, CommandTable};
use crate::protocol::RespValue;
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::sync::Arc;

pub(crate) const HELP_TEXT: &str = "Available commands:\r\n\
PING [message] - Test the connection\r\n\
SET key value - Store a value under a key\r\n\
GET key - Fetch the value of a key\r\n\
DEL key [key ...] - Remove keys, replying with how many existed\r\n\
CONFIG GET pattern - Read configuration ('*' for all)\r\n\
CONFIG SET name value - Change a configuration entry\r\n\
SELECT db - Accepted for compatibility, there is one database\r\n\
HELP - Show this help";

/// Executes commands against a shared [`StorageEngine`].
///
/// Cloning is cheap; every connection gets its own clone.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
    table: Arc<CommandTable>,
}

impl CommandHandler {
    /// Creates a command handler with every supported command registered.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self {
            storage,
            table: Arc::new(command_table()),
        }
    }

    /// Executes a command and returns the reply.
    ///
    /// # Arguments
    ///
    /// * `command` - The verb followed by its arguments
    pub fn execute(&self, command: &[Bytes]) -> RespValue {
        match self.table.resolve(command) {
            Ok((spec, args)) => (spec.handler)(self, args),
            Err(e) => e.into_reply(),
        }
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    // ========================================================================
    // Key commands
    // ========================================================================

    /// SET key value
    ///
    /// Always overwrites an existing value.
    fn cmd_set(&self, args: &[Bytes]) -> RespValue {
        self.storage.set(args[0].clone(), args[1].clone());
        RespValue::ok()
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> RespValue {
        match self.storage.get(&args[0]) {
            Some(value) => RespValue::bulk_string(value),
            None => RespValue::null(),
        }
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[Bytes]) -> RespValue {
        let deleted = self.storage.delete_many(args);
        RespValue::integer(deleted as i64)
    }

    // ========================================================================
    // Configuration commands
    // ========================================================================

    /// CONFIG GET pattern
    ///
    /// `*` matches every entry, anything else is an exact name.
    fn cmd_config_get(&self, args: &[Bytes]) -> RespValue {
        let pattern = String::from_utf8_lossy(&args[0]);

        let pairs = if pattern == "*" {
            self.storage.config_entries()
        } else {
            self.storage
                .get_config(&pattern)
                .map(|value| vec![(pattern.into_owned(), value)])
                .unwrap_or_default()
        };

        RespValue::array(
            pairs
                .into_iter()
                .flat_map(|(name, value)| {
                    [
                        RespValue::bulk_string(Bytes::from(name)),
                        RespValue::bulk_string(Bytes::from(value)),
                    ]
                })
                .collect(),
        )
    }

    /// CONFIG SET name value
    fn cmd_config_set(&self, args: &[Bytes]) -> RespValue {
        match (std::str::from_utf8(&args[0]), std::str::from_utf8(&args[1])) {
            (Ok(name), Ok(value)) => {
                self.storage.set_config(name, value);
                RespValue::ok()
            }
            _ => RespValue::error("ERR CONFIG SET name and value must be valid UTF-8"),
        }
    }

    // ========================================================================
    // Connection commands
    // ========================================================================

    /// PING [message]
    fn cmd_ping(&self, args: &[Bytes]) -> RespValue {
        match args.first() {
            Some(message) => RespValue::bulk_string(message.clone()),
            None => RespValue::pong(),
        }
    }

    /// SELECT index
    ///
    /// There is a single database; the index is ignored.
    fn cmd_select(&self, _args: &[Bytes]) -> RespValue {
        RespValue::ok()
    }

    /// HELP
    fn cmd_help(&self, _args: &[Bytes]) -> RespValue {
        RespValue::bulk_string(Bytes::from_static(HELP_TEXT.as_bytes()))
    }
}

fn command_table() -> CommandTable {
    let mut table = CommandTable::new();
    table
        .register(CommandSpec::new("ping", Arity::Range(0, 1), CommandHandler::cmd_ping))
        .register(CommandSpec::new("set", Arity::Exact(2), CommandHandler::cmd_set))
        .register(CommandSpec::new("get", Arity::Exact(1), CommandHandler::cmd_get))
        .register(CommandSpec::new("del", Arity::AtLeast(1), CommandHandler::cmd_del))
        .register(CommandSpec::new("select", Arity::Exact(1), CommandHandler::cmd_select))
        .register(CommandSpec::new("help", Arity::Exact(0), CommandHandler::cmd_help))
        .register_group(
            "config",
            &[
                CommandSpec::new("config get", Arity::Exact(1), CommandHandler::cmd_config_get),
                CommandSpec::new("config set", Arity::Exact(2), CommandHandler::cmd_config_set),
            ],
        );
    table
}
