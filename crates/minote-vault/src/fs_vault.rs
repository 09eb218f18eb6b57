//! Filesystem-backed vault storage
//!
//! Remote timestamps are mapped onto the written files: creation time goes
//! to the access time, modification time to the modification time.

use std::fs::FileTimes;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use minote_config::VaultConfig;
use minote_core::{paths, RenameOutcome, StorageError, StorageResult, VaultStorage};

/// Vault storage rooted at the mirror directory
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    attachment_folder: String,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>, attachment_folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            attachment_folder: attachment_folder.into(),
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.mirror_root(), config.attachment_folder.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a mirror-relative path, refusing anything that escapes the root.
    pub fn resolve(&self, relative: &str) -> StorageResult<PathBuf> {
        let relative = relative.replace('\\', "/");
        let candidate = Path::new(&relative);
        let mut resolved = self.root.clone();

        for component in candidate.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::InvalidPath(relative.clone()));
                }
            }
        }
        Ok(resolved)
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(parent.display().to_string(), e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VaultStorage for FsVault {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;
        fs::try_exists(&full)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    async fn create_folder(&self, path: &str, created_ms: i64) -> StorageResult<()> {
        let full = self.resolve(path)?;
        if fs::try_exists(&full).await.map_err(|e| StorageError::io(path, e))? {
            return Ok(());
        }

        fs::create_dir_all(&full)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        debug!("Created folder {}", path);

        if let Err(e) = stamp(full, created_ms, created_ms).await {
            warn!("Could not stamp folder {}: {}", path, e);
        }
        Ok(())
    }

    async fn rename_folder(&self, from: &str, to: &str) -> StorageResult<RenameOutcome> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        if !fs::try_exists(&source).await.map_err(|e| StorageError::io(from, e))? {
            debug!("Rename source {} does not exist, nothing to move", from);
            return Ok(RenameOutcome::SourceMissing);
        }
        if fs::try_exists(&target).await.map_err(|e| StorageError::io(to, e))? {
            warn!("Rename target {} already exists, leaving {} in place", to, from);
            return Ok(RenameOutcome::TargetExists);
        }

        self.ensure_parent(&target).await?;
        fs::rename(&source, &target)
            .await
            .map_err(|e| StorageError::io(from, e))?;
        info!("Renamed folder {} -> {}", from, to);
        Ok(RenameOutcome::Moved)
    }

    async fn delete_file(&self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => {
                debug!("Deleted {}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn write_text(
        &self,
        path: &str,
        content: &str,
        created_ms: i64,
        modified_ms: i64,
    ) -> StorageResult<()> {
        let full = self.resolve(path)?;
        self.ensure_parent(&full).await?;
        fs::write(&full, content)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        stamp(full, created_ms, modified_ms).await
    }

    async fn write_binary(&self, path: &str, bytes: &[u8]) -> StorageResult<()> {
        let full = self.resolve(path)?;
        self.ensure_parent(&full).await?;
        fs::write(&full, bytes)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    fn attachment_path(&self, owner_document: &str, file_name: &str) -> String {
        paths::join(&[paths::parent(owner_document), &self.attachment_folder, file_name])
    }
}

fn system_time(ms: i64) -> Option<SystemTime> {
    u64::try_from(ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(|ms| UNIX_EPOCH + Duration::from_millis(ms))
}

/// Set access and modification times; non-positive timestamps are left alone.
async fn stamp(path: PathBuf, accessed_ms: i64, modified_ms: i64) -> StorageResult<()> {
    let mut times = FileTimes::new();
    let mut any = false;
    if let Some(accessed) = system_time(accessed_ms) {
        times = times.set_accessed(accessed);
        any = true;
    }
    if let Some(modified) = system_time(modified_ms) {
        times = times.set_modified(modified);
        any = true;
    }
    if !any {
        return Ok(());
    }

    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || std::fs::File::open(&path)?.set_times(times))
        .await
        .map_err(|e| StorageError::Backend(format!("timestamp task failed: {}", e)))?
        .map_err(|e| StorageError::io(display, e))
}
