//! Loading configuration from TOML files

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::MinoteConfig;

/// Errors raised while reading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`MinoteConfig`]
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        /// Offending path
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A value violates an invariant
    #[error("Invalid configuration for {field}: {message}")]
    Invalid {
        /// Dotted key of the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create a validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Environment variable carrying the session cookie
pub const COOKIE_ENV_VAR: &str = "MINOTE_COOKIE";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default config location: `<config_dir>/minote/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("minote").join("config.toml"))
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(content: &str, origin: &Path) -> ConfigResult<MinoteConfig> {
        let config: MinoteConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub async fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<MinoteConfig> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content, path)
    }

    /// Load the given file, or the default location if it exists, or defaults.
    ///
    /// An explicitly named file must exist; the default location is optional.
    pub async fn load_or_default(path: Option<&Path>) -> ConfigResult<MinoteConfig> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        match Self::default_path() {
            Some(default) if tokio::fs::try_exists(&default).await.unwrap_or(false) => {
                Self::load_from_file(&default).await
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(MinoteConfig::default())
            }
        }
    }

    /// Apply the cookie override chain: explicit value, then environment.
    pub fn apply_cookie_override(config: &mut MinoteConfig, explicit: Option<String>) {
        let from_env = std::env::var(COOKIE_ENV_VAR).ok().filter(|v| !v.is_empty());
        if let Some(cookie) = explicit.or(from_env) {
            config.remote.cookie = Some(cookie);
        }
    }
}
