//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;
mod watch;

pub use run::RunCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run management
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run { command } => run::handle_run_command(command, config).await,
    }
}
