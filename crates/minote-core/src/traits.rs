//! Collaborator traits
//!
//! The sync engine only talks to the outside world through these. All
//! methods take `&self`; implementations synchronize internally and are
//! shared as `Arc<dyn Trait>`.

use async_trait::async_trait;

use crate::error::{RemoteResult, StorageResult};
use crate::types::{CatalogPage, LedgerRecord, NoteDetail};

/// Remote catalog and content service
#[async_trait]
pub trait RemoteNoteService: Send + Sync {
    /// Fetch one catalog page; `None` requests the first page.
    async fn fetch_page(&self, cursor: Option<&str>) -> RemoteResult<CatalogPage>;

    /// Fetch the full entry of one note.
    async fn fetch_note_details(&self, id: &str) -> RemoteResult<NoteDetail>;

    /// Fetch the raw bytes of one attachment.
    async fn fetch_image(&self, file_id: &str) -> RemoteResult<Vec<u8>>;
}

/// What a folder rename actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The folder now lives under the new name
    Moved,
    /// Nothing under the old name to move
    SourceMissing,
    /// The new name is taken; the old folder was left in place
    TargetExists,
}

/// Document tree rooted at the mirror location
///
/// Paths are `/`-separated and relative to the mirror root.
#[async_trait]
pub trait VaultStorage: Send + Sync {
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Create a folder (and parents) unless it exists, stamping `created_ms`.
    async fn create_folder(&self, path: &str, created_ms: i64) -> StorageResult<()>;

    /// Rename a folder. A missing source or an existing target moves nothing
    /// and is reported as such.
    async fn rename_folder(&self, from: &str, to: &str) -> StorageResult<RenameOutcome>;

    /// Delete a file. A missing file is a no-op.
    async fn delete_file(&self, path: &str) -> StorageResult<()>;

    /// Write a text document and map the remote timestamps onto the file.
    async fn write_text(
        &self,
        path: &str,
        content: &str,
        created_ms: i64,
        modified_ms: i64,
    ) -> StorageResult<()>;

    async fn write_binary(&self, path: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Where an attachment named `file_name` owned by `owner_document` lives.
    fn attachment_path(&self, owner_document: &str, file_name: &str) -> String;
}

/// Persistent sync ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_all(&self) -> StorageResult<Vec<LedgerRecord>>;

    /// Replace the whole ledger.
    async fn set_all(&self, records: Vec<LedgerRecord>) -> StorageResult<()>;

    async fn clear(&self) -> StorageResult<()>;
}
