/// CLI argument parsing and command handling - Gateway
mod args;
mod commands;

pub use args::{CacheAction, Cli, Commands, HistoryAction};
pub use commands::{handle_command, list_business_types};
