//! Reconciliation engine
//!
//! One run:
//!
//! 1. **Ledger**: cleared when forced, otherwise loaded
//! 2. **Walk**: the full catalog, fatal on remote failure
//! 3. **Taxonomy**: folder names, then renames applied to disk and ledger
//! 4. **Notes**: skip, create or replace each note in catalog order
//! 5. **Persist**: the new ledger, replaced as a whole
//!
//! A note that fails in step 4 is reported and left out of the new ledger,
//! so the next run retries it. Nothing else in the run is affected.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use minote_config::{CategoryMode, LinkStyle, MinoteConfig};
use minote_core::{
    paths, LedgerRecord, LedgerStore, Note, RemoteNoteService, RenameOutcome, VaultStorage,
};
use minote_markup::{compose_document, FrontMatter, MarkupTransformer};

use crate::attachments::AttachmentResolver;
use crate::catalog::{Catalog, CatalogWalker};
use crate::report::{NoteFailure, SyncReport};
use crate::strategy::{strategy_for, CategoryStrategy};
use crate::taxonomy::{apply_rename, Taxonomy};

/// Configuration for engine behavior
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    pub category_mode: CategoryMode,
    /// Root of every front-matter tag
    pub tag_prefix: String,
    /// Bound on concurrent downloads within one note
    pub max_concurrent_downloads: usize,
    pub uncategorized_label: String,
    pub link_style: LinkStyle,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self::from(&MinoteConfig::default())
    }
}

impl From<&MinoteConfig> for SyncEngineConfig {
    fn from(config: &MinoteConfig) -> Self {
        Self {
            category_mode: config.sync.category_mode,
            tag_prefix: config.sync.tag_prefix.clone(),
            max_concurrent_downloads: config.sync.max_concurrent_downloads,
            uncategorized_label: config.sync.uncategorized_label.clone(),
            link_style: config.vault.link_style,
        }
    }
}

/// Per-note decision against the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Skip,
    Create,
    Replace,
}

/// The sync orchestrator
///
/// ```text
/// SyncEngine
///   ├─> CatalogWalker      (RemoteNoteService::fetch_page)
///   ├─> Taxonomy           (folder names, renames via VaultStorage)
///   ├─> AttachmentResolver (RemoteNoteService::fetch_image, VaultStorage)
///   ├─> MarkupTransformer  (body + front matter)
///   └─> LedgerStore        (read at start, replaced at end)
/// ```
///
/// Runs must be serialized by the caller; the engine holds no lock.
pub struct SyncEngine {
    remote: Arc<dyn RemoteNoteService>,
    vault: Arc<dyn VaultStorage>,
    ledger: Arc<dyn LedgerStore>,
    walker: CatalogWalker,
    resolver: AttachmentResolver,
    transformer: MarkupTransformer,
    strategy: Box<dyn CategoryStrategy>,
    config: SyncEngineConfig,
}

impl SyncEngine {
    /// Create an engine with the default configuration
    pub fn new(
        remote: Arc<dyn RemoteNoteService>,
        vault: Arc<dyn VaultStorage>,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self::with_config(remote, vault, ledger, SyncEngineConfig::default())
    }

    pub fn with_config(
        remote: Arc<dyn RemoteNoteService>,
        vault: Arc<dyn VaultStorage>,
        ledger: Arc<dyn LedgerStore>,
        config: SyncEngineConfig,
    ) -> Self {
        let walker = CatalogWalker::new(Arc::clone(&remote));
        let resolver = AttachmentResolver::new(
            Arc::clone(&remote),
            Arc::clone(&vault),
            config.link_style,
            config.max_concurrent_downloads,
        );

        Self {
            remote,
            vault,
            ledger,
            walker,
            resolver,
            transformer: MarkupTransformer::new(),
            strategy: strategy_for(config.category_mode),
            config,
        }
    }

    /// Run once and return the number of notes written.
    pub async fn sync(&self, force: bool) -> Result<usize> {
        Ok(self.sync_with_report(force).await?.synced)
    }

    /// Run once and return the full outcome.
    ///
    /// `Err` only for run-level failures: ledger load or persist, or the
    /// catalog walk. Per-note failures are in [`SyncReport::failed`].
    pub async fn sync_with_report(&self, force: bool) -> Result<SyncReport> {
        info!("Starting sync (force: {}, layout: {})", force, self.strategy.name());
        let mut report = SyncReport::default();

        // Phase 1: Ledger
        let mut previous: HashMap<String, LedgerRecord> = if force {
            self.ledger
                .clear()
                .await
                .context("Phase 1: Failed to clear ledger for forced resync")?;
            HashMap::new()
        } else {
            self.ledger
                .get_all()
                .await
                .context("Phase 1: Failed to load ledger")?
                .into_iter()
                .filter(LedgerRecord::is_note)
                .map(|record| (record.id.clone(), record))
                .collect()
        };
        debug!("Phase 1: {} ledger records", previous.len());

        // Phase 2: Walk
        let catalog = self
            .walker
            .walk()
            .await
            .context("Phase 2: Failed to walk the remote catalog")?;

        // Phase 3: Taxonomy and renames
        let taxonomy = Taxonomy::build(&catalog.folders, &self.config.uncategorized_label);
        if self.strategy.tracks_renames() {
            self.migrate_renames(&taxonomy, &catalog, &mut previous).await;
        }

        // Phase 4: Notes
        let folder_created: HashMap<&str, i64> = catalog
            .folders
            .iter()
            .map(|folder| (folder.id.as_str(), folder.create_date))
            .collect();
        let mut next: Vec<LedgerRecord> = Vec::with_capacity(catalog.notes.len());

        let actions: Vec<Action> = catalog
            .notes
            .iter()
            .map(|note| decide(previous.get(&note.id), note))
            .collect();
        // Paths kept by skipped notes are taken before any note is written
        let mut claimed: HashSet<String> = catalog
            .notes
            .iter()
            .zip(&actions)
            .filter(|(_, action)| **action == Action::Skip)
            .filter_map(|(note, _)| previous.get(&note.id))
            .map(|record| record.relative_path.clone())
            .collect();

        for (note, &action) in catalog.notes.iter().zip(&actions) {
            let prior = previous.get(&note.id);

            if action == Action::Skip {
                debug!("Skipping unchanged note {} ({})", note.id, note.title);
                if let Some(record) = prior {
                    next.push(record.clone());
                }
                report.skipped += 1;
                continue;
            }

            let folder_name = taxonomy.name_of(&note.folder_id);
            let created = folder_created
                .get(note.folder_id.as_str())
                .copied()
                .unwrap_or(0);
            let relative_path = self.claim_path(note, folder_name, &mut claimed);
            // Title change or folder move, unless another note now owns the old path
            let stale = prior
                .map(|record| record.relative_path.as_str())
                .filter(|old| !old.is_empty() && *old != relative_path && !claimed.contains(*old));

            match self
                .write_note(note, folder_name, relative_path, created, stale, &mut report)
                .await
            {
                Ok(record) => {
                    debug!("{:?} note {} -> {}", action, note.id, record.relative_path);
                    next.push(record);
                    report.synced += 1;
                }
                Err(e) => {
                    warn!("Failed to sync note {} ({}): {:#}", note.id, note.title, e);
                    report.failed.push(NoteFailure {
                        id: note.id.clone(),
                        title: note.title.clone(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }

        // Phase 5: Persist
        self.ledger
            .set_all(next)
            .await
            .context("Phase 5: Failed to persist ledger")?;

        info!("Sync finished: {}", report);
        Ok(report)
    }

    /// Rename directories whose folder changed name and rewrite ledger paths
    /// before any note is processed.
    async fn migrate_renames(
        &self,
        taxonomy: &Taxonomy,
        catalog: &Catalog,
        previous: &mut HashMap<String, LedgerRecord>,
    ) {
        let current_folder_of: HashMap<String, String> = catalog
            .notes
            .iter()
            .map(|note| (note.id.clone(), note.folder_id.clone()))
            .collect();
        let renames = taxonomy.detect_renames(previous.values(), &current_folder_of);

        for rename in renames {
            let from = self.strategy.note_dir(&rename.from);
            let to = self.strategy.note_dir(&rename.to);
            match self.vault.rename_folder(&from, &to).await {
                Ok(RenameOutcome::Moved) => {
                    let moved = apply_rename(previous, &rename);
                    info!(
                        "Folder {} renamed {} -> {} ({} ledger paths rewritten)",
                        rename.folder_id, rename.from, rename.to, moved
                    );
                }
                Ok(RenameOutcome::SourceMissing) => debug!(
                    "Folder {} renamed {} -> {} but nothing is on disk under the old name",
                    rename.folder_id, rename.from, rename.to
                ),
                Ok(RenameOutcome::TargetExists) => warn!(
                    "Folder {} renamed {} -> {} but the new name is taken; notes stay put until they change",
                    rename.folder_id, rename.from, rename.to
                ),
                Err(e) => warn!(
                    "Could not rename folder {} -> {}: {}",
                    rename.from, rename.to, e
                ),
            }
        }
    }

    /// Document path for `note`, suffixed with its id when another note
    /// already holds the plain one this run.
    fn claim_path(&self, note: &Note, folder_name: &str, claimed: &mut HashSet<String>) -> String {
        let dir = self.strategy.note_dir(folder_name);
        let plain = paths::join(&[&dir, &format!("{}.md", note.title)]);
        if claimed.insert(plain.clone()) {
            return plain;
        }

        let suffixed = paths::join(&[&dir, &format!("{}_{}.md", note.title, note.id)]);
        warn!(
            "Note {} shares the path {} with another note, writing {} instead",
            note.id, plain, suffixed
        );
        claimed.insert(suffixed.clone());
        suffixed
    }

    /// Create or replace one note; any error fails only this note.
    async fn write_note(
        &self,
        note: &Note,
        folder_name: &str,
        relative_path: String,
        folder_created: i64,
        stale: Option<&str>,
        report: &mut SyncReport,
    ) -> Result<LedgerRecord> {
        let dir = paths::parent(&relative_path).to_string();

        if !dir.is_empty() {
            self.vault
                .create_folder(&dir, folder_created)
                .await
                .with_context(|| format!("Failed to create folder '{}'", dir))?;
        }

        let detail = self
            .remote
            .fetch_note_details(&note.id)
            .await
            .with_context(|| format!("Failed to fetch details of note {}", note.id))?;

        let resolution = self.resolver.resolve(detail.attachments(), &relative_path).await;
        report.attachments_downloaded += resolution.downloaded;
        report.attachments_failed += resolution.failed;

        let body = self
            .transformer
            .transform(&detail, note.note_type, &note.title, &resolution.links)
            .with_context(|| format!("Failed to transform note {}", note.id))?;

        let mut front_matter = FrontMatter::new(&note.id, note.create_date, note.modify_date);
        if note.has_explicit_title {
            front_matter = front_matter.with_alias(&note.title);
        }
        let front_matter = front_matter
            .with_tag(format!("{}/type/{}", self.config.tag_prefix, note.note_type.as_str()))
            .with_tag(self.strategy.category_tag(&self.config.tag_prefix, folder_name));
        let document = compose_document(&front_matter, &body)
            .with_context(|| format!("Failed to compose note {}", note.id))?;

        // The old file goes before the new one lands
        if let Some(old) = stale {
            match self.vault.delete_file(old).await {
                Ok(()) => debug!("Removed stale file {}", old),
                Err(e) => warn!("Could not remove stale file {}: {}", old, e),
            }
        }

        self.vault
            .write_text(&relative_path, &document, note.create_date, note.modify_date)
            .await
            .with_context(|| format!("Failed to write '{}'", relative_path))?;

        Ok(LedgerRecord::for_note(note, relative_path, folder_name.to_string()))
    }
}

fn decide(prior: Option<&LedgerRecord>, note: &Note) -> Action {
    match prior {
        None => Action::Create,
        Some(record) if record.sync_time >= note.modify_date => Action::Skip,
        Some(_) => Action::Replace,
    }
}
