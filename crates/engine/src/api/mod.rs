//! API layer - command-line entry point.

pub mod command;
pub mod repl;

pub use command::{parse_command, CharacterRef, Command, CommandError};
pub use repl::Repl;
