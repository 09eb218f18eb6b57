//! Folder id to name mapping and rename detection

use std::collections::{HashMap, HashSet};

use tracing::debug;

use minote_core::{paths, Folder, LedgerRecord, UNCATEGORIZED_FOLDER_ID};

/// A folder whose name changed since the last run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRename {
    pub folder_id: String,
    pub from: String,
    pub to: String,
}

/// Folder names for one run, read-only once built
#[derive(Debug, Clone)]
pub struct Taxonomy {
    names: HashMap<String, String>,
    fallback: String,
}

impl Taxonomy {
    /// Seed the reserved ids, then overlay every discovered folder.
    pub fn build(folders: &[Folder], uncategorized_label: &str) -> Self {
        let fallback = normalize_name(uncategorized_label);
        let mut names = HashMap::new();
        names.insert(UNCATEGORIZED_FOLDER_ID.to_string(), fallback.clone());

        for folder in folders {
            let name = normalize_name(&folder.name);
            if name.is_empty() {
                debug!("Folder {} has no usable name, keeping its id", folder.id);
                names.insert(folder.id.clone(), folder.id.clone());
            } else {
                names.insert(folder.id.clone(), name);
            }
        }

        Self { names, fallback }
    }

    /// Name for a folder id; unknown ids land in the uncategorized folder.
    pub fn name_of(&self, folder_id: &str) -> &str {
        self.names
            .get(folder_id)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Whether this run knows `folder_id`, either from the walk or as a reserved id
    pub fn contains(&self, folder_id: &str) -> bool {
        self.names.contains_key(folder_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Folders whose recorded name differs from the current one.
    ///
    /// `current_folder_of` maps note ids to their folder in this run and is
    /// consulted for records written before folder ids were recorded. Each
    /// folder yields at most one rename. Folders missing from this run's
    /// catalog were deleted remotely, not renamed, and yield none.
    pub fn detect_renames<'r>(
        &self,
        records: impl IntoIterator<Item = &'r LedgerRecord>,
        current_folder_of: &HashMap<String, String>,
    ) -> Vec<FolderRename> {
        let mut renames = Vec::new();
        let mut decided = HashSet::new();

        for record in records {
            if record.folder_name.is_empty() {
                continue;
            }
            let Some(folder_id) = record
                .folder_id
                .as_ref()
                .or_else(|| current_folder_of.get(&record.id))
            else {
                continue;
            };
            if !decided.insert(folder_id.clone()) {
                continue;
            }

            let Some(current) = self.names.get(folder_id.as_str()) else {
                debug!("Folder {} is gone from the catalog, not a rename", folder_id);
                continue;
            };
            if *current != record.folder_name {
                renames.push(FolderRename {
                    folder_id: folder_id.clone(),
                    from: record.folder_name.clone(),
                    to: current.clone(),
                });
            }
        }

        renames
    }
}

/// Rewrite ledger paths and folder names after a folder rename.
///
/// Returns the number of records whose path moved.
pub fn apply_rename(records: &mut HashMap<String, LedgerRecord>, rename: &FolderRename) -> usize {
    let mut moved = 0;
    for record in records.values_mut() {
        if let Some(path) = paths::replace_prefix(&record.relative_path, &rename.from, &rename.to) {
            record.relative_path = path;
            moved += 1;
        }
        if record.folder_name == rename.from {
            record.folder_name = rename.to.clone();
        }
    }
    moved
}

/// Collapse whitespace runs and path separators into underscores.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.trim().chars() {
        if c.is_whitespace() || c == '/' || c == '\\' {
            pending_sep = true;
        } else {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.push(c);
        }
    }
    out
}
