//! Local persistence for the Mi Notes mirror
//!
//! - [`FsVault`]: [`minote_core::VaultStorage`] over a directory tree
//! - [`JsonLedgerStore`]: [`minote_core::LedgerStore`] as a single JSON file

pub mod fs_vault;
pub mod json_ledger;

pub use fs_vault::FsVault;
pub use json_ledger::JsonLedgerStore;
