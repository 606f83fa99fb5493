//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default `.env` location.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// DrugShift Telegram bot.
#[derive(Debug, Parser)]
#[command(name = "drugshift", version, about)]
pub struct Cli {
    /// Config file (default: `$DRUGSHIFT_CONFIG` or `./config.toml`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Credentials file with API_ID, API_HASH and BOT_TOKEN.
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Run the bot until interrupted.
    Start,
    /// Validate config and credentials, then verify the bot token.
    Check,
    /// Post a message to the configured target channel.
    Notify {
        /// Message text (HTML).
        text: String,
    },
}
