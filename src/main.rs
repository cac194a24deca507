use anyhow::Result;
use clap::Parser;

use market_gap::{
    app::{load_config, AppState},
    cli::{handle_command, Cli},
    utils::init_logger,
};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Stores are opened once here and shared by reference with every command
    let config = load_config(cli.config.as_deref())?;
    let state = AppState::new(config)?;

    handle_command(&cli.command, &state)
}
