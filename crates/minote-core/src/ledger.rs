//! In-memory ledger store
//!
//! Useful for tests and one-shot runs where persistence isn't needed.
//! Clones share the same storage.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StorageResult;
use crate::traits::LedgerStore;
use crate::types::LedgerRecord;

#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    records: Arc<RwLock<Vec<LedgerRecord>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing ledger
    pub fn with_records(records: Vec<LedgerRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_all(&self) -> StorageResult<Vec<LedgerRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn set_all(&self, records: Vec<LedgerRecord>) -> StorageResult<()> {
        *self.records.write().await = records;
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
