//! Minote Core
//!
//! Domain types and collaborator abstractions for mirroring Mi Notes into a
//! local markdown vault.
//!
//! Core defines the traits; infrastructure crates implement them:
//! - [`RemoteNoteService`] - paginated catalog, note details, binaries (`minote-remote`)
//! - [`VaultStorage`] - document tree writes with preserved timestamps (`minote-vault`)
//! - [`LedgerStore`] - persisted per-note sync state (`minote-vault`, [`InMemoryLedgerStore`])

pub mod error;
pub mod ledger;
pub mod paths;
pub mod title;
pub mod traits;
pub mod types;

pub use error::{RemoteError, RemoteResult, StorageError, StorageResult};
pub use ledger::InMemoryLedgerStore;
pub use title::{derive_title, sanitize_title, DerivedTitle};
pub use traits::{LedgerStore, RemoteNoteService, RenameOutcome, VaultStorage};
pub use types::{
    AttachmentDescriptor, CatalogPage, ExtraInfo, Folder, LedgerRecord, Note, NoteDetail,
    NoteSetting, NoteType, RawFolderEntry, RawNoteEntry, LEDGER_KIND_NOTE,
    UNCATEGORIZED_FOLDER_ID,
};
