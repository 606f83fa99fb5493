//! Configuration loading.
//!
//! Loads `config.toml` (or `$DRUGSHIFT_CONFIG`, or `--config`). Environment
//! variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Env var naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "DRUGSHIFT_CONFIG";

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram settings.
    pub telegram: TelegramConfig,
    /// Fixed reply texts.
    pub replies: RepliesConfig,
    /// Log level and optional file output.
    pub logging: LoggingConfig,
    /// File the config was read from; `None` when running on defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// `explicit` is the `--config` flag. A path given by flag or by
    /// `$DRUGSHIFT_CONFIG` must exist; the default `./config.toml` may be
    /// absent, in which case defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let (path, required) = config_path_with(explicit, &env);
        let mut config = Self::load_from_file(&path, required)?;
        config.apply_overrides(env);
        Ok(config)
    }

    fn load_from_file(path: &Path, required: bool) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let mut config = Self::from_toml(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))?;
                config.source = Some(path.to_path_buf());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config at {}: {e}",
                path.display()
            )),
        }
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function so tests never touch the process env.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("TARGET_CHANNEL") {
            self.telegram.target_channel = Some(v);
        }

        if let Some(v) = env("DRUGSHIFT_WELCOME_TEXT") {
            self.replies.welcome = v;
        }
        if let Some(v) = env("DRUGSHIFT_CANNED_TEXT") {
            self.replies.canned = v;
        }

        if let Some(v) = env("DRUGSHIFT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env("DRUGSHIFT_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(v));
        }
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has wrong value types.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse config TOML")
    }

    /// Parsed target channel, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is blank or malformed.
    pub fn target_channel(&self) -> Result<Option<TargetChannel>, TargetChannelError> {
        self.telegram
            .target_channel
            .as_deref()
            .map(str::parse::<TargetChannel>)
            .transpose()
    }
}

/// Resolve the config path and whether it has to exist.
///
/// `--config` first, then `$DRUGSHIFT_CONFIG`, then `./config.toml`.
pub fn config_path_with(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> (PathBuf, bool) {
    if let Some(p) = explicit {
        return (p.to_path_buf(), true);
    }
    if let Some(p) = env(CONFIG_PATH_ENV) {
        return (PathBuf::from(p), true);
    }
    (PathBuf::from(DEFAULT_CONFIG_FILE), false)
}

// ── Telegram ────────────────────────────────────────────────────

/// Telegram settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Channel `notify` posts to: numeric id or `@username`.
    pub target_channel: Option<String>,
}

/// Where `notify` delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChannel {
    /// Numeric chat id, e.g. `-1001234567890`.
    Id(i64),
    /// Public channel username, always stored with the leading `@`.
    Username(String),
}

impl fmt::Display for TargetChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

/// Errors from parsing a target channel value.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TargetChannelError {
    /// The value was empty or whitespace.
    #[error("target channel is empty")]
    Empty,
    /// Looked numeric but does not fit a chat id.
    #[error("target channel id out of range: {0}")]
    OutOfRange(String),
    /// Not a number and not a valid username.
    #[error("invalid target channel username: {0}")]
    InvalidUsername(String),
}

impl FromStr for TargetChannel {
    type Err = TargetChannelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(TargetChannelError::Empty);
        }

        let digits = value.strip_prefix('-').unwrap_or(value);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return value
                .parse::<i64>()
                .map(Self::Id)
                .map_err(|_| TargetChannelError::OutOfRange(value.to_owned()));
        }

        let name = value.strip_prefix('@').unwrap_or(value);
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(TargetChannelError::InvalidUsername(value.to_owned()));
        }
        Ok(Self::Username(format!("@{name}")))
    }
}

// ── Replies ─────────────────────────────────────────────────────

/// Fixed reply texts, HTML formatted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepliesConfig {
    /// Answer to `/start`.
    pub welcome: String,
    /// Answer to every plain text message.
    pub canned: String,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        Self {
            welcome: DEFAULT_WELCOME.to_owned(),
            canned: DEFAULT_CANNED.to_owned(),
        }
    }
}

/// Default `/start` answer.
pub const DEFAULT_WELCOME: &str = "<b>مرحباً!</b> أنا بوت المراقبة الخاص بك.\n\n\
     أتابع تغييرات أسعار الأدوية وأنشرها في القناة.";

/// Default answer to plain text.
pub const DEFAULT_CANNED: &str =
    "شكراً لرسالتك! هذا البوت ينشر تحديثات أسعار الأدوية في القناة فقط.";

// ── Logging ─────────────────────────────────────────────────────

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily-rotated JSON logs. Console only when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            dir: None,
        }
    }
}
