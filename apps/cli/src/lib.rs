//! Reefwatch CLI: risk predictions and a streamed assistant chat in the
//! terminal.

pub use cmd::{Cli, Command};

pub mod cmd;
pub mod config;
pub mod repl;
pub mod terminal;
