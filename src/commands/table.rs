//! Command lookup table
//!
//! Maps a normalized (upper-case) verb to the function that runs it and the
//! number of arguments it takes. Verbs with subcommands, such as `CONFIG`,
//! map to a group that is looked up again with the second token.
//!
//! Adding a command is one `register` call; nothing else changes.

use crate::commands::CommandHandler;
use crate::protocol::RespValue;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Runs a command. Receives the arguments after the verb (and subcommand).
pub type Handler = fn(&CommandHandler, &[Bytes]) -> RespValue;

/// How many arguments a command accepts, not counting its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive on both ends
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Range(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

/// One runnable command.
#[derive(Clone, Copy)]
pub struct CommandSpec {
    /// Lower-case name as shown in error messages, e.g. `get` or `config get`
    pub name: &'static str,
    pub arity: Arity,
    pub handler: Handler,
}

impl CommandSpec {
    pub const fn new(name: &'static str, arity: Arity, handler: Handler) -> Self {
        Self {
            name,
            arity,
            handler,
        }
    }

    /// The table key: the last word of the name, upper-cased.
    fn key(&self) -> String {
        self.name
            .rsplit(' ')
            .next()
            .unwrap_or(self.name)
            .to_ascii_uppercase()
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Debug)]
enum Route {
    Command(CommandSpec),
    Group {
        name: &'static str,
        subcommands: HashMap<String, CommandSpec>,
    },
}

/// Why a command could not be dispatched. The `Display` text is what the
/// client receives after `ERR `.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("unknown subcommand '{subcommand}' for '{group}'")]
    UnknownSubcommand {
        group: &'static str,
        subcommand: String,
    },

    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(&'static str),
}

impl DispatchError {
    pub fn into_reply(self) -> RespValue {
        RespValue::error(format!("ERR {}", self))
    }
}

/// Verb → command table.
#[derive(Debug, Default)]
pub struct CommandTable {
    routes: HashMap<String, Route>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level command, replacing any earlier one with the same verb.
    pub fn register(&mut self, spec: CommandSpec) -> &mut Self {
        self.routes.insert(spec.key(), Route::Command(spec));
        self
    }

    /// Adds a verb whose first argument selects one of `subcommands`.
    pub fn register_group(&mut self, name: &'static str, subcommands: &[CommandSpec]) -> &mut Self {
        let subcommands = subcommands.iter().map(|spec| (spec.key(), *spec)).collect();
        self.routes.insert(
            name.to_ascii_uppercase(),
            Route::Group { name, subcommands },
        );
        self
    }

    /// Finds the command for `command` and checks its arity.
    ///
    /// Returns the command together with the arguments it should receive.
    pub fn resolve<'a>(
        &self,
        command: &'a [Bytes],
    ) -> Result<(&CommandSpec, &'a [Bytes]), DispatchError> {
        let (verb, args) = command.split_first().ok_or(DispatchError::Empty)?;
        let verb = String::from_utf8_lossy(verb);

        let (spec, args) = match self.routes.get(&verb.to_ascii_uppercase()) {
            Some(Route::Command(spec)) => (spec, args),
            Some(Route::Group { name, subcommands }) => {
                let (subcommand, args) = args
                    .split_first()
                    .ok_or(DispatchError::WrongArity(*name))?;
                let subcommand = String::from_utf8_lossy(subcommand);

                let spec = subcommands
                    .get(&subcommand.to_ascii_uppercase())
                    .ok_or_else(|| DispatchError::UnknownSubcommand {
                        group: *name,
                        subcommand: subcommand.into_owned(),
                    })?;
                (spec, args)
            }
            None => return Err(DispatchError::UnknownCommand(verb.into_owned())),
        };

        if !spec.arity.accepts(args.len()) {
            return Err(DispatchError::WrongArity(spec.name));
        }

        Ok((spec, args))
    }

    /// Registered top-level verbs, upper-cased.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}
