mod detect;
mod gps;

use clap::{CommandFactory, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::detect::DetectCommands;
use crate::gps::GpsCommands;

#[derive(Debug, Parser)]
#[command(name = "shopaudit-cli")]
#[command(about = "Shop audit visit validation and brand detection")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check visit GPS fixes against the shop location
    Gps {
        #[command(subcommand)]
        command: GpsCommands,
    },
    /// Summarize brand presence in shelf photos
    Detect {
        #[command(subcommand)]
        command: DetectCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = shopaudit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Gps { command }) => gps::run(&config, command)?,
        Some(Commands::Detect { command }) => detect::run(&config, command).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// Write `value` to stdout as pretty-printed JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests;
