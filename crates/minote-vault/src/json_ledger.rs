//! JSON file ledger
//!
//! The whole ledger is one JSON array, replaced atomically: written to a
//! sibling `.tmp` file, then renamed over the original.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use minote_core::{LedgerRecord, LedgerStore, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl LedgerStore for JsonLedgerStore {
    /// A missing file is an empty ledger; an unreadable one is an error.
    async fn get_all(&self) -> StorageResult<Vec<LedgerRecord>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", self.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(self.display(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("corrupt ledger {}: {}", self.display(), e))
        })
    }

    async fn set_all(&self, records: Vec<LedgerRecord>) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent.display().to_string(), e))?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json)
            .await
            .map_err(|e| StorageError::io(temp_path.display().to_string(), e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::io(self.display(), e))?;

        info!("Ledger persisted: {} records to {}", records.len(), self.display());
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(self.display(), e)),
        }
    }
}
