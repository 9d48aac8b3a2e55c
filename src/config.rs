//! Account configuration
//!
//! Accounts come either from a JSON file listing several mailboxes or,
//! for the single-account case, from `IMAP_*` environment variables.

use crate::error::{Error, Result};
use crate::folder::Folder;
use serde::{Deserialize, Deserializer, Serialize};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

const DEFAULT_PORT: u16 = 993;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the connection to the IMAP server is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// TLS from the first byte (usually port 993).
    #[default]
    Implicit,
    /// Plain TCP upgraded with STARTTLS (usually port 143).
    StartTls,
}

impl std::str::FromStr for TlsMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "implicit" | "tls" | "ssl" => Ok(Self::Implicit),
            "starttls" => Ok(Self::StartTls),
            other => Err(Error::Config(format!("Invalid TLS mode: {other}"))),
        }
    }
}

/// Credentials and connection settings for one mailbox account.
///
/// Immutable once handed to a checker.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccountConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub tls: TlsMode,
    /// Skip certificate verification, for local bridges with
    /// self-signed certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub folder: Folder,
    /// Upper bound for each network step of a check. Read from
    /// `timeout_secs`, which may be fractional.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        deserialize_with = "deserialize_timeout_secs"
    )]
    pub timeout: Duration,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn timeout_from_secs(secs: f64) -> std::result::Result<Duration, String> {
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout {secs}: {e}"))
}

fn deserialize_timeout_secs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    timeout_from_secs(secs).map_err(serde::de::Error::custom)
}

impl AccountConfig {
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            tls: TlsMode::default(),
            accept_invalid_certs: false,
            folder: Folder::default(),
            timeout: default_timeout(),
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub const fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<Folder>) -> Self {
        self.folder = folder.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Per-operation network timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reject settings no check could succeed with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::Config(format!(
                "{}: timeout must be greater than zero",
                self.username
            )));
        }
        Ok(())
    }

    /// The identity this account is reported under.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.username
    }

    /// Load a single account from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `IMAP_HOST`
    /// - `IMAP_USERNAME`
    /// - `IMAP_PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `IMAP_PORT` (default: `993`)
    /// - `IMAP_TLS` (`implicit` or `starttls`, default: `implicit`)
    /// - `IMAP_ACCEPT_INVALID_CERTS` (default: `false`)
    /// - `IMAP_FOLDER` (default: `INBOX`)
    /// - `IMAP_TIMEOUT_SECS` (default: `30`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build an account from a variable lookup using the same names as
    /// [`AccountConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| Error::Config(format!("{key} not set")));

        let mut config = Self::new(
            required("IMAP_HOST")?,
            required("IMAP_USERNAME")?,
            required("IMAP_PASSWORD")?,
        );

        if let Some(port) = lookup("IMAP_PORT") {
            config.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?;
        }
        if let Some(tls) = lookup("IMAP_TLS") {
            config.tls = tls.parse()?;
        }
        if let Some(accept) = lookup("IMAP_ACCEPT_INVALID_CERTS") {
            config.accept_invalid_certs = parse_bool("IMAP_ACCEPT_INVALID_CERTS", &accept)?;
        }
        if let Some(folder) = lookup("IMAP_FOLDER") {
            config.folder = Folder::from(folder);
        }
        if let Some(secs) = lookup("IMAP_TIMEOUT_SECS") {
            let secs: f64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_TIMEOUT_SECS: {e}")))?;
            config.timeout = timeout_from_secs(secs)
                .map_err(|e| Error::Config(format!("Invalid IMAP_TIMEOUT_SECS: {e}")))?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!("Invalid {key}: {other}"))),
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("folder", &self.folder)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountsFile {
    Wrapped { accounts: Vec<AccountConfig> },
    Bare(Vec<AccountConfig>),
}

/// Load account configurations from a JSON file.
///
/// The file holds either `{"accounts": [...]}` or a bare array of
/// account objects. Order in the file is registration order.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed, or
/// if an account fails [`AccountConfig::validate`].
pub fn load_accounts(path: impl AsRef<Path>) -> Result<Vec<AccountConfig>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {e}", path.display())))?;
    let accounts = parse_accounts(&raw)
        .map_err(|e| Error::Config(format!("Invalid {}: {e}", path.display())))?;

    for account in &accounts {
        account
            .validate()
            .map_err(|e| Error::Config(format!("Invalid {}: {e}", path.display())))?;
    }
    Ok(accounts)
}

fn parse_accounts(raw: &str) -> serde_json::Result<Vec<AccountConfig>> {
    let file: AccountsFile = serde_json::from_str(raw)?;
    Ok(match file {
        AccountsFile::Wrapped { accounts } | AccountsFile::Bare(accounts) => accounts,
    })
}
