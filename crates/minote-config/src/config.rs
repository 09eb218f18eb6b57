//! Configuration types
//!
//! Every section has a `Default` so a config file only needs the keys it
//! wants to change.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ConfigError;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinoteConfig {
    /// Remote note service settings
    pub remote: RemoteConfig,
    /// Local vault layout
    pub vault: VaultConfig,
    /// Sync behavior
    pub sync: SyncOptions,
    /// Ledger persistence
    pub ledger: LedgerConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl MinoteConfig {
    /// Check invariants the sync engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.host.trim().is_empty() && self.remote.base_url.is_none() {
            return Err(ConfigError::invalid("remote.host", "must not be empty"));
        }
        if self.remote.page_limit == 0 {
            return Err(ConfigError::invalid("remote.page_limit", "must be at least 1"));
        }
        if self.sync.max_concurrent_downloads == 0 {
            return Err(ConfigError::invalid(
                "sync.max_concurrent_downloads",
                "must be at least 1",
            ));
        }
        if self.vault.attachment_folder.trim().is_empty() {
            return Err(ConfigError::invalid("vault.attachment_folder", "must not be empty"));
        }
        if has_separator(&self.vault.attachment_folder) {
            return Err(ConfigError::invalid(
                "vault.attachment_folder",
                "must be a single folder name",
            ));
        }
        if self.sync.tag_prefix.trim().is_empty() || has_separator(&self.sync.tag_prefix) {
            return Err(ConfigError::invalid(
                "sync.tag_prefix",
                "must be a non-empty name without separators",
            ));
        }
        Ok(())
    }

    /// Ledger file location, falling back to `<base_folder>/.minote/ledger.json`.
    pub fn ledger_path(&self) -> PathBuf {
        self.ledger
            .path
            .clone()
            .unwrap_or_else(|| self.vault.base_folder.join(".minote").join("ledger.json"))
    }
}

fn has_separator(value: &str) -> bool {
    value.contains('/') || value.contains('\\')
}

/// Remote note service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Host identifier, e.g. `i.mi.com`
    pub host: String,
    /// Full base URL override (scheme included); wins over `host`
    pub base_url: Option<String>,
    /// Session cookie captured by an external login flow
    pub cookie: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Catalog page size
    pub page_limit: u32,
    /// Retry behavior for transient failures
    pub retry: RetryConfig,
}

impl RemoteConfig {
    /// Resolved base URL without trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host.trim_end_matches('/')),
        }
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "i.mi.com".to_string(),
            base_url: None,
            cookie: None,
            timeout_secs: 30,
            page_limit: 200,
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration for remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first failure
    pub max_retries: u32,
    /// Initial backoff in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds
    pub max_backoff_ms: u64,
}

impl RetryConfig {
    /// Initial backoff duration
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Maximum backoff duration
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
        }
    }
}

/// How attachment references are written into note bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[[img/file.png]]`
    #[default]
    Wikilink,
    /// `[](img/file.png)`
    Markdown,
}

/// Local vault layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root directory
    pub base_folder: PathBuf,
    /// Sub folder of the vault that holds the mirror
    pub note_location: String,
    /// Folder created next to each note for its binaries
    pub attachment_folder: String,
    /// Reference syntax for attachments
    pub link_style: LinkStyle,
}

impl VaultConfig {
    /// Directory every storage path is relative to.
    pub fn mirror_root(&self) -> PathBuf {
        if self.note_location.is_empty() {
            self.base_folder.clone()
        } else {
            self.base_folder.join(&self.note_location)
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            base_folder: PathBuf::from("."),
            note_location: "MiNotes".to_string(),
            attachment_folder: "img".to_string(),
            link_style: LinkStyle::default(),
        }
    }
}

/// Folder-per-directory versus flat-with-tag organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryMode {
    /// One directory per remote folder
    #[default]
    Folder,
    /// All notes in the mirror root, folder carried as a tag
    Tag,
}

/// Sync behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Organization strategy
    pub category_mode: CategoryMode,
    /// Root of every tag written into front matter
    pub tag_prefix: String,
    /// Upper bound on concurrent attachment downloads within one note
    pub max_concurrent_downloads: usize,
    /// Label for the reserved uncategorized folder id `0`
    pub uncategorized_label: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            category_mode: CategoryMode::default(),
            tag_prefix: "minote".to_string(),
            max_concurrent_downloads: 8,
            uncategorized_label: "未分类".to_string(),
        }
    }
}

/// Ledger persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Explicit ledger file; see [`MinoteConfig::ledger_path`]
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the `minote_*` targets (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
