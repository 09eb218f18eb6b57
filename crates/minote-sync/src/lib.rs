//! Mi Notes reconciliation engine
//!
//! Mirrors the remote catalog into a vault one way, incrementally and
//! idempotently. The pieces, leaf first:
//!
//! - [`Taxonomy`]: folder id to name, rename detection
//! - [`CatalogWalker`]: pagination to completion
//! - [`AttachmentResolver`]: bounded concurrent downloads, link map
//! - [`SyncEngine`]: per-note skip / create / replace and the ledger
//!
//! Collaborators come in as `Arc<dyn Trait>` from `minote-core`, so the
//! engine runs the same against the HTTP client and filesystem vault as
//! against in-memory test doubles.

pub mod attachments;
pub mod catalog;
pub mod engine;
pub mod report;
pub mod strategy;
pub mod taxonomy;

pub use attachments::{format_link, AttachmentResolver, Resolution};
pub use catalog::{Catalog, CatalogWalker};
pub use engine::{SyncEngine, SyncEngineConfig};
pub use report::{NoteFailure, SyncReport};
pub use strategy::{strategy_for, CategoryStrategy, FolderLayout, TagLayout};
pub use taxonomy::{apply_rename, normalize_name, FolderRename, Taxonomy};
