//! Common test doubles for sync tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use minote_core::{
    paths, AttachmentDescriptor, CatalogPage, InMemoryLedgerStore, NoteDetail, NoteSetting,
    RemoteError, RemoteNoteService, RemoteResult, RenameOutcome, StorageError, StorageResult,
    VaultStorage,
};
use minote_sync::{SyncEngine, SyncEngineConfig};

// ============================================================================
// Catalog builders
// ============================================================================

pub fn note_entry(id: &str, title: Option<&str>, snippet: &str, folder_id: &str, modify: i64) -> Value {
    let extra = match title {
        Some(title) => json!({ "title": title }).to_string(),
        None => "{}".to_string(),
    };
    json!({
        "id": id,
        "type": "note",
        "snippet": snippet,
        "extraInfo": extra,
        "folderId": folder_id,
        "createDate": 1_600_000_000_000i64,
        "modifyDate": modify,
    })
}

pub fn folder_entry(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "type": "folder",
        "subject": name,
        "createDate": 1_500_000_000_000i64,
    })
}

pub fn page(entries: Vec<Value>, folders: Vec<Value>, next: Option<&str>) -> CatalogPage {
    CatalogPage {
        entries,
        folders,
        last_page: next.is_none(),
        sync_tag: next.map(str::to_string),
    }
}

pub fn detail(content: &str) -> NoteDetail {
    NoteDetail {
        content: content.to_string(),
        ..Default::default()
    }
}

pub fn detail_with_images(content: &str, file_ids: &[&str]) -> NoteDetail {
    NoteDetail {
        content: content.to_string(),
        setting: Some(NoteSetting {
            data: file_ids
                .iter()
                .map(|id| AttachmentDescriptor {
                    file_id: id.to_string(),
                    mime_type: "image/png".to_string(),
                    digest: None,
                })
                .collect(),
        }),
        ..Default::default()
    }
}

// ============================================================================
// Mock remote service
// ============================================================================

#[derive(Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<MockRemoteState>>,
}

#[derive(Default)]
struct MockRemoteState {
    /// Pages keyed by the cursor that requests them
    pages: HashMap<Option<String>, CatalogPage>,
    details: HashMap<String, NoteDetail>,
    images: HashMap<String, Vec<u8>>,
    failing_details: HashSet<String>,
    failing_images: HashSet<String>,
    fail_pages: bool,
    page_calls: Vec<Option<String>>,
    detail_calls: Vec<String>,
    image_calls: Vec<String>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-page catalog
    pub fn set_catalog(&self, entries: Vec<Value>, folders: Vec<Value>) {
        self.set_pages(vec![page(entries, folders, None)]);
    }

    /// Chain pages by their `sync_tag`: the first page answers `None`.
    pub fn set_pages(&self, pages: Vec<CatalogPage>) {
        let mut state = self.state.lock().unwrap();
        state.pages.clear();
        let mut cursor: Option<String> = None;
        for page in pages {
            let next = page.sync_tag.clone();
            state.pages.insert(cursor, page);
            cursor = next;
        }
    }

    pub fn set_detail(&self, id: &str, detail: NoteDetail) {
        self.state.lock().unwrap().details.insert(id.to_string(), detail);
    }

    pub fn set_image(&self, file_id: &str, bytes: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .images
            .insert(file_id.to_string(), bytes.to_vec());
    }

    pub fn fail_detail(&self, id: &str, enabled: bool) {
        let mut state = self.state.lock().unwrap();
        if enabled {
            state.failing_details.insert(id.to_string());
        } else {
            state.failing_details.remove(id);
        }
    }

    pub fn fail_image(&self, file_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_images
            .insert(file_id.to_string());
    }

    pub fn fail_pages(&self, enabled: bool) {
        self.state.lock().unwrap().fail_pages = enabled;
    }

    pub fn page_calls(&self) -> usize {
        self.state.lock().unwrap().page_calls.len()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().detail_calls.clone()
    }

    pub fn image_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().image_calls.clone()
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.page_calls.clear();
        state.detail_calls.clear();
        state.image_calls.clear();
    }
}

#[async_trait]
impl RemoteNoteService for MockRemote {
    async fn fetch_page(&self, cursor: Option<&str>) -> RemoteResult<CatalogPage> {
        let mut state = self.state.lock().unwrap();
        let key = cursor.map(str::to_string);
        state.page_calls.push(key.clone());

        if state.fail_pages {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        state
            .pages
            .get(&key)
            .cloned()
            .ok_or_else(|| RemoteError::Protocol(format!("unknown cursor {:?}", key)))
    }

    async fn fetch_note_details(&self, id: &str) -> RemoteResult<NoteDetail> {
        let mut state = self.state.lock().unwrap();
        state.detail_calls.push(id.to_string());

        if state.failing_details.contains(id) {
            return Err(RemoteError::HttpStatus {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(state.details.get(id).cloned().unwrap_or_default())
    }

    async fn fetch_image(&self, file_id: &str) -> RemoteResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.image_calls.push(file_id.to_string());

        if state.failing_images.contains(file_id) {
            return Err(RemoteError::Transport("timeout".to_string()));
        }
        Ok(state.images.get(file_id).cloned().unwrap_or_else(|| vec![0u8; 4]))
    }
}

// ============================================================================
// In-memory vault
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryVault {
    state: Arc<Mutex<MemoryVaultState>>,
}

#[derive(Default)]
struct MemoryVaultState {
    files: HashMap<String, Vec<u8>>,
    folders: HashSet<String>,
    writes: Vec<String>,
    deletes: Vec<String>,
    renames: Vec<(String, String)>,
    timestamps: HashMap<String, (i64, i64)>,
    failing_writes: HashSet<String>,
}

impl MemoryVaultState {
    /// A file at `path`, or a folder there holding anything
    fn holds(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.files.contains_key(path)
            || self.folders.contains(path)
            || self.files.keys().any(|p| p.starts_with(&prefix))
    }
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file as if a previous run had written it
    pub fn seed(&self, path: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), content.as_bytes().to_vec());
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(path)
    }

    pub fn file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.state.lock().unwrap().files.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn renames(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().renames.clone()
    }

    pub fn timestamps(&self, path: &str) -> Option<(i64, i64)> {
        self.state.lock().unwrap().timestamps.get(path).copied()
    }

    /// Record an empty folder, as if created by hand
    pub fn seed_folder(&self, path: &str) {
        self.state.lock().unwrap().folders.insert(path.to_string());
    }

    pub fn fail_write(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_writes
            .insert(path.to_string());
    }

    fn record_write(&self, path: &str, bytes: Vec<u8>) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_writes.contains(path) {
            return Err(StorageError::Backend(format!("disk full writing {}", path)));
        }
        state.writes.push(path.to_string());
        state.files.insert(path.to_string(), bytes);
        Ok(())
    }
}

#[async_trait]
impl VaultStorage for MemoryVault {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.state.lock().unwrap().holds(path))
    }

    async fn create_folder(&self, path: &str, _created_ms: i64) -> StorageResult<()> {
        self.state.lock().unwrap().folders.insert(path.to_string());
        Ok(())
    }

    async fn rename_folder(&self, from: &str, to: &str) -> StorageResult<RenameOutcome> {
        let mut state = self.state.lock().unwrap();
        state.renames.push((from.to_string(), to.to_string()));

        if !state.holds(from) {
            return Ok(RenameOutcome::SourceMissing);
        }
        if state.holds(to) {
            return Ok(RenameOutcome::TargetExists);
        }

        let moved: Vec<String> = state
            .files
            .keys()
            .filter(|p| paths::replace_prefix(p, from, to).is_some())
            .cloned()
            .collect();
        for old in moved {
            if let (Some(bytes), Some(new)) = (state.files.remove(&old), paths::replace_prefix(&old, from, to)) {
                state.files.insert(new, bytes);
            }
        }
        if state.folders.remove(from) {
            state.folders.insert(to.to_string());
        }
        Ok(RenameOutcome::Moved)
    }

    async fn delete_file(&self, path: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(path.to_string());
        state.files.remove(path);
        Ok(())
    }

    async fn write_text(
        &self,
        path: &str,
        content: &str,
        created_ms: i64,
        modified_ms: i64,
    ) -> StorageResult<()> {
        self.record_write(path, content.as_bytes().to_vec())?;
        self.state
            .lock()
            .unwrap()
            .timestamps
            .insert(path.to_string(), (created_ms, modified_ms));
        Ok(())
    }

    async fn write_binary(&self, path: &str, bytes: &[u8]) -> StorageResult<()> {
        self.record_write(path, bytes.to_vec())
    }

    fn attachment_path(&self, owner_document: &str, file_name: &str) -> String {
        paths::join(&[paths::parent(owner_document), "img", file_name])
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub remote: MockRemote,
    pub vault: MemoryVault,
    pub ledger: InMemoryLedgerStore,
    pub engine: SyncEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SyncEngineConfig::default())
    }

    pub fn with_config(config: SyncEngineConfig) -> Self {
        Self::with_ledger(InMemoryLedgerStore::new(), config)
    }

    pub fn with_ledger(ledger: InMemoryLedgerStore, config: SyncEngineConfig) -> Self {
        let remote = MockRemote::new();
        let vault = MemoryVault::new();
        let engine = SyncEngine::with_config(
            Arc::new(remote.clone()),
            Arc::new(vault.clone()),
            Arc::new(ledger.clone()),
            config,
        );
        Self {
            remote,
            vault,
            ledger,
            engine,
        }
    }
}
