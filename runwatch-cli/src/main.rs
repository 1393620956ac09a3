//! Runwatch CLI
//!
//! Command-line interface for submitting runs to the run service and
//! following them until they finish.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "runwatch")]
#[command(about = "Submit runs and watch them finish", long_about = None)]
struct Cli {
    /// Run service URL
    #[arg(
        long,
        env = "RUNWATCH_SERVER_URL",
        default_value = "http://localhost:8080"
    )]
    server_url: String,

    /// Verbose logging, including retried status checks
    #[arg(long, env = "RUNWATCH_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug);

    let config = Config {
        server_url: cli.server_url,
        debug: cli.debug,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}

/// Logs go to stderr so command output on stdout stays clean
fn init_logging(debug: bool) {
    let default_filter = if debug {
        "runwatch=debug,runwatch_poller=debug,runwatch_client=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
