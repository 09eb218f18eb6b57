//! Attachment resolver
//!
//! Downloads a note's binaries next to the note and builds the link map the
//! markup transformer consumes. Files already present are reused, never
//! fetched again. A failed attachment is logged and left out of the map.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use minote_config::LinkStyle;
use minote_core::{paths, AttachmentDescriptor, RemoteNoteService, VaultStorage};
use minote_markup::LinkMap;

/// Result of resolving one note's attachments
#[derive(Debug, Default)]
pub struct Resolution {
    pub links: LinkMap,
    pub downloaded: usize,
    pub reused: usize,
    pub failed: usize,
}

enum Outcome {
    Downloaded,
    Reused,
}

pub struct AttachmentResolver {
    remote: Arc<dyn RemoteNoteService>,
    vault: Arc<dyn VaultStorage>,
    link_style: LinkStyle,
    max_concurrent: usize,
}

impl AttachmentResolver {
    pub fn new(
        remote: Arc<dyn RemoteNoteService>,
        vault: Arc<dyn VaultStorage>,
        link_style: LinkStyle,
        max_concurrent: usize,
    ) -> Self {
        Self {
            remote,
            vault,
            link_style,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Resolve every attachment of the note stored at `owner_document`.
    pub async fn resolve(&self, attachments: &[AttachmentDescriptor], owner_document: &str) -> Resolution {
        let mut seen = HashSet::new();
        let unique: Vec<&AttachmentDescriptor> = attachments
            .iter()
            .filter(|att| !att.file_id.is_empty() && seen.insert(att.file_id.as_str()))
            .collect();

        let results: Vec<(&AttachmentDescriptor, String, Result<Outcome>)> = stream::iter(unique)
            .map(|att| async move {
                let path = self.vault.attachment_path(owner_document, &att.local_file_name());
                let outcome = self.fetch_once(att, &path).await;
                (att, path, outcome)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut resolution = Resolution::default();
        for (att, path, outcome) in results {
            match outcome {
                Ok(outcome) => {
                    match outcome {
                        Outcome::Downloaded => resolution.downloaded += 1,
                        Outcome::Reused => resolution.reused += 1,
                    }
                    let reference = self.reference(owner_document, &path);
                    resolution.links.insert(att.file_id.clone(), reference);
                }
                Err(e) => {
                    warn!("Attachment {} of {} failed: {:#}", att.file_id, owner_document, e);
                    resolution.failed += 1;
                }
            }
        }
        resolution
    }

    async fn fetch_once(&self, att: &AttachmentDescriptor, path: &str) -> Result<Outcome> {
        if self.vault.exists(path).await.context("existence check failed")? {
            debug!("Reusing {}", path);
            return Ok(Outcome::Reused);
        }

        let bytes = self
            .remote
            .fetch_image(&att.file_id)
            .await
            .with_context(|| format!("download of {} failed", att.file_id))?;
        self.vault
            .write_binary(path, &bytes)
            .await
            .with_context(|| format!("write of {} failed", path))?;
        debug!("Downloaded {} ({} bytes)", path, bytes.len());
        Ok(Outcome::Downloaded)
    }

    /// Local reference to `path`, relative to the owner's folder
    fn reference(&self, owner_document: &str, path: &str) -> String {
        let base = paths::parent(owner_document);
        let relative = if base.is_empty() {
            path
        } else {
            path.strip_prefix(base)
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(path)
        };
        format_link(self.link_style, relative)
    }
}

/// Reference syntax without the embed marker
pub fn format_link(style: LinkStyle, target: &str) -> String {
    match style {
        LinkStyle::Wikilink => format!("[[{}]]", target),
        LinkStyle::Markdown if target.contains(' ') => format!("[](<{}>)", target),
        LinkStyle::Markdown => format!("[]({})", target),
    }
}
