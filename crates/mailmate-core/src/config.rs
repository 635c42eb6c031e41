//! Application configuration.
//!
//! Loaded from a JSON file; every field has a default so a partial or
//! missing file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage;

const APP_DIR: &str = "mailmate";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the key, credentials, contacts and logs.
    pub data_dir: PathBuf,
    /// Language model endpoint.
    pub completion: CompletionConfig,
    /// Web search endpoint.
    pub search: SearchConfig,
    /// Outgoing mail server.
    pub smtp: SmtpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR),
            completion: CompletionConfig::default(),
            search: SearchConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl Config {
    /// Default location of the config file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Loads the config from `path`, or from [`Config::default_path`].
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        match storage::read_optional(&path)? {
            Some(bytes) => {
                debug!("Loading config from {}", path.display());
                serde_json::from_slice(&bytes)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
            }
            None => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    /// File locations under [`Config::data_dir`].
    #[must_use]
    pub fn paths(&self) -> StorePaths {
        StorePaths::new(&self.data_dir)
    }
}

/// OpenAI-compatible chat completion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// API base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "openai/gpt-3.5-turbo".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    /// Reads the API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] if the variable is unset or blank.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                crate::assistant::ProviderError::MissingApiKey(self.api_key_env.clone()).into()
            })
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Web search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Instant-answer API endpoint.
    pub endpoint: String,
    /// Maximum snippets passed to the model.
    pub max_results: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.duckduckgo.com/".to_string(),
            max_results: 3,
            timeout_secs: 15,
        }
    }
}

impl SearchConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Connection security for SMTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

/// Outgoing mail server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connection security.
    pub security: Security,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 465,
            security: Security::Tls,
        }
    }
}

/// Locations of the persisted stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Encryption key.
    pub key: PathBuf,
    /// Encrypted credential pair.
    pub credentials: PathBuf,
    /// Contact directory.
    pub contacts: PathBuf,
    /// Send log.
    pub send_log: PathBuf,
    /// Revision log.
    pub revisions: PathBuf,
}

impl StorePaths {
    /// Derives all store paths from one directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            key: data_dir.join("secret.key"),
            credentials: data_dir.join("secrets.json"),
            contacts: data_dir.join("contacts.json"),
            send_log: data_dir.join("sent_log.csv"),
            revisions: data_dir.join("revisions.csv"),
        }
    }
}
