//! Catalog walker
//!
//! Follows the opaque cursor until the service reports the last page and
//! returns the fully materialized catalog. Remote failures abort the walk;
//! a malformed entry is logged and skipped.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use minote_core::{
    derive_title, ExtraInfo, Folder, Note, RawFolderEntry, RawNoteEntry, RemoteError,
    RemoteNoteService, RemoteResult,
};

/// Everything one walk produced
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub notes: Vec<Note>,
    pub folders: Vec<Folder>,
    /// Number of pages fetched
    pub pages: usize,
}

pub struct CatalogWalker {
    remote: Arc<dyn RemoteNoteService>,
}

impl CatalogWalker {
    pub fn new(remote: Arc<dyn RemoteNoteService>) -> Self {
        Self { remote }
    }

    pub async fn walk(&self) -> RemoteResult<Catalog> {
        let mut catalog = Catalog::default();
        let mut seen_notes = HashSet::new();
        let mut seen_cursors = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.remote.fetch_page(cursor.as_deref()).await?;
            catalog.pages += 1;
            debug!(
                "Catalog page {}: {} entries, {} folders, last: {}",
                catalog.pages,
                page.entries.len(),
                page.folders.len(),
                page.last_page
            );

            for entry in page.entries.iter().chain(page.folders.iter()) {
                match entry_kind(entry) {
                    Some("note") => {
                        if let Some(note) = parse_note(entry) {
                            if seen_notes.insert(note.id.clone()) {
                                catalog.notes.push(note);
                            }
                        }
                    }
                    Some("folder") => {
                        if let Some(folder) = parse_folder(entry) {
                            upsert_folder(&mut catalog.folders, folder);
                        }
                    }
                    other => debug!("Ignoring catalog entry of kind {:?}", other),
                }
            }

            if page.last_page {
                break;
            }

            let next = page
                .sync_tag
                .filter(|tag| !tag.is_empty())
                .ok_or_else(|| RemoteError::Protocol("page is not last but carries no cursor".to_string()))?;
            if !seen_cursors.insert(next.clone()) {
                return Err(RemoteError::Protocol(format!(
                    "cursor {} repeated, pagination would not terminate",
                    next
                )));
            }
            cursor = Some(next);
        }

        info!(
            "Catalog walk complete: {} notes, {} folders over {} pages",
            catalog.notes.len(),
            catalog.folders.len(),
            catalog.pages
        );
        Ok(catalog)
    }
}

fn entry_kind(entry: &Value) -> Option<&str> {
    entry.get("type").and_then(Value::as_str)
}

fn parse_note(entry: &Value) -> Option<Note> {
    let raw: RawNoteEntry = match serde_json::from_value(entry.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Skipping malformed note entry: {}", e);
            return None;
        }
    };

    let extra = ExtraInfo::parse(raw.extra_info.as_deref());
    let derived = derive_title(&raw.id, &extra, &raw.snippet);
    Some(Note {
        note_type: extra.note_type(),
        title: derived.title,
        has_explicit_title: derived.explicit,
        id: raw.id,
        create_date: raw.create_date,
        modify_date: raw.modify_date,
        folder_id: raw.folder_id,
    })
}

fn parse_folder(entry: &Value) -> Option<Folder> {
    match serde_json::from_value::<RawFolderEntry>(entry.clone()) {
        Ok(raw) => Some(Folder {
            id: raw.id,
            name: raw.subject,
            create_date: raw.create_date,
        }),
        Err(e) => {
            warn!("Skipping malformed folder entry: {}", e);
            None
        }
    }
}

fn upsert_folder(folders: &mut Vec<Folder>, folder: Folder) {
    match folders.iter_mut().find(|f| f.id == folder.id) {
        Some(existing) => *existing = folder,
        None => folders.push(folder),
    }
}
