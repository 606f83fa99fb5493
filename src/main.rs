//! DrugShift bot binary.
//!
//! Loads credentials and configuration, sets up logging, then runs the
//! requested subcommand.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::Bot;
use tracing::info;

use drugshift::cli::{Cli, Command};
use drugshift::config::Config;
use drugshift::credentials::{layered_resolver, load_runtime_credentials, TelegramCredentials};
use drugshift::logging;
use drugshift::router::MessageRouter;
use drugshift::telegram::{self, notify};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Precedence: process env > .env file > config.toml > defaults.
    let creds = load_runtime_credentials(&cli.env_file).context("failed to load credentials")?;
    let config = Config::load(
        cli.config.as_deref(),
        layered_resolver(&creds, |key| std::env::var(key).ok()),
    )
    .context("failed to load configuration")?;

    let _log_guard = match (&cli.command, &config.logging.dir) {
        (Command::Start, Some(dir)) => Some(logging::init_production(dir, &config.logging.level)?),
        _ => {
            logging::init_cli(&config.logging.level);
            None
        }
    };

    // Both loads above run before a subscriber exists; report them now.
    match &config.source {
        Some(path) => info!(path = %path.display(), "loaded config from file"),
        None => info!("no config file found, using defaults"),
    }
    info!(
        env_file = %cli.env_file.display(),
        keys = creds.len(),
        "credentials loaded"
    );

    let target = config
        .target_channel()
        .context("invalid target channel")?;
    let telegram_creds =
        TelegramCredentials::from_credentials(&creds).context("invalid Telegram credentials")?;
    let bot = Bot::new(&telegram_creds.bot_token);

    match cli.command {
        Command::Start => {
            info!(version = env!("CARGO_PKG_VERSION"), "drugshift starting");
            let me = telegram::authenticate(&bot).await?;
            let router = Arc::new(MessageRouter::from_config(&config.replies));
            info!("bot is running and listening for messages");
            telegram::run_bot(bot, &me, router).await?;
            info!("bot stopped");
            Ok(())
        }
        Command::Check => {
            let me = telegram::authenticate(&bot).await?;
            let username = me.user.username.as_deref().unwrap_or("<none>");
            println!("ok: authenticated as @{username}");
            match target {
                Some(channel) => println!("target channel: {channel}"),
                None => println!("target channel: not configured"),
            }
            Ok(())
        }
        Command::Notify { text } => {
            let channel = target.context(
                "no target channel configured; set TARGET_CHANNEL or [telegram].target_channel",
            )?;
            notify::send_notification(&bot, &channel, &text)
                .await
                .context("failed to send notification")?;
            Ok(())
        }
    }
}
