//! Credential loading from a `.env` file and the process environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Telegram API identifier key.
pub const API_ID: &str = "API_ID";
/// Telegram API secret key.
pub const API_HASH: &str = "API_HASH";
/// Bot token key.
pub const BOT_TOKEN: &str = "BOT_TOKEN";
/// Target channel key, also read by the config override layer.
pub const TARGET_CHANNEL: &str = "TARGET_CHANNEL";

/// Keys picked up from the process environment.
pub const KNOWN_KEYS: [&str; 4] = [API_ID, API_HASH, BOT_TOKEN, TARGET_CHANNEL];

/// Errors from loading or validating credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    /// One or more required keys are absent or blank.
    #[error("missing required credentials: {}", .0.join(", "))]
    Missing(Vec<String>),
    /// A key that must be an integer is not.
    #[error("{key} must be an integer, got {value:?}")]
    InvalidInteger {
        /// Offending key.
        key: String,
        /// Raw value.
        value: String,
    },
    /// The `.env` file is readable by group or others.
    #[error("credentials file {} must be 0600, found {mode:o}", path.display())]
    InsecurePermissions {
        /// File path.
        path: PathBuf,
        /// Permission bits found.
        mode: u32,
    },
    /// The `.env` file could not be read.
    #[error("failed to read credentials at {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A line of the `.env` file could not be parsed.
    #[error("failed to parse credentials file {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        source: dotenvy::Error,
    },
}

/// Runtime credentials: key-value pairs from `.env` and the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Collect the given keys from an env resolver, skipping unset ones.
    pub fn from_env_with(keys: &[&str], env: impl Fn(&str) -> Option<String>) -> Self {
        let vars = keys
            .iter()
            .filter_map(|key| env(key).map(|value| ((*key).to_owned(), value)))
            .collect();
        Self { vars }
    }

    /// Returns a credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns a required credential or an error when missing.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Missing`] when the key is absent or blank.
    pub fn require(&self, key: &str) -> Result<String, CredentialsError> {
        self.vars
            .get(key)
            .filter(|value| !value.trim().is_empty())
            .cloned()
            .ok_or_else(|| CredentialsError::Missing(vec![key.to_owned()]))
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn overlay(mut self, other: Credentials) -> Self {
        self.vars.extend(other.vars);
        self
    }

    /// Number of loaded keys.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no keys are loaded.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Validated Telegram credentials.
#[derive(Clone)]
pub struct TelegramCredentials {
    /// Telegram API identifier.
    pub api_id: i32,
    /// Telegram API secret.
    pub api_hash: String,
    /// Bot token; the only value the Bot API consumes.
    pub bot_token: String,
}

impl std::fmt::Debug for TelegramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramCredentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"[REDACTED]")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

impl TelegramCredentials {
    /// Validate and extract Telegram credentials.
    ///
    /// Every missing key is reported at once so a broken `.env` is fixed in
    /// one pass.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::Missing`] listing all absent keys, or
    /// [`CredentialsError::InvalidInteger`] when `API_ID` is not a number.
    pub fn from_credentials(creds: &Credentials) -> Result<Self, CredentialsError> {
        let missing: Vec<String> = [API_ID, API_HASH, BOT_TOKEN]
            .into_iter()
            .filter(|key| creds.require(key).is_err())
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Err(CredentialsError::Missing(missing));
        }

        let raw_id = creds.require(API_ID)?;
        let api_id = raw_id
            .trim()
            .parse::<i32>()
            .map_err(|_| CredentialsError::InvalidInteger {
                key: API_ID.to_owned(),
                value: raw_id.clone(),
            })?;

        Ok(Self {
            api_id,
            api_hash: creds.require(API_HASH)?,
            bot_token: creds.require(BOT_TOKEN)?.trim().to_owned(),
        })
    }
}

/// Load credentials from a specific `.env` path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, its permissions are too
/// broad, or parsing fails.
pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsError> {
    validate_private_permissions(path)?;

    let iter = dotenvy::from_path_iter(path).map_err(|source| CredentialsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut vars = BTreeMap::new();
    for item in iter {
        let (key, value) = item.map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// Load runtime credentials: the `.env` file if present, overlaid by the
/// process environment for [`KNOWN_KEYS`].
///
/// # Errors
///
/// Returns an error when an existing `.env` file is invalid.
pub fn load_runtime_credentials(env_file: &Path) -> Result<Credentials, CredentialsError> {
    load_runtime_credentials_with(env_file, |key| std::env::var(key).ok())
}

/// [`load_runtime_credentials`] with an injected env resolver.
///
/// # Errors
///
/// Returns an error when an existing `.env` file is invalid.
pub fn load_runtime_credentials_with(
    env_file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, CredentialsError> {
    let from_file = if env_file.exists() {
        load_credentials(env_file)?
    } else {
        Credentials::default()
    };

    Ok(from_file.overlay(Credentials::from_env_with(&KNOWN_KEYS, env)))
}

/// Layer `env` over `creds` for config overrides: process env > `.env`.
///
/// Covers every key, not only [`KNOWN_KEYS`], so `DRUGSHIFT_*` overrides set
/// in both places resolve to the environment value.
pub fn layered_resolver<'a>(
    creds: &'a Credentials,
    env: impl Fn(&str) -> Option<String> + 'a,
) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| env(key).or_else(|| creds.get(key).map(str::to_owned))
}

#[cfg(unix)]
fn validate_private_permissions(path: &Path) -> Result<(), CredentialsError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| CredentialsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode() & 0o777;

    if mode & 0o077 != 0 {
        return Err(CredentialsError::InsecurePermissions {
            path: path.to_path_buf(),
            mode,
        });
    }

    Ok(())
}

#[cfg(not(unix))]
fn validate_private_permissions(path: &Path) -> Result<(), CredentialsError> {
    fs::metadata(path)
        .map(|_| ())
        .map_err(|source| CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        })
}
