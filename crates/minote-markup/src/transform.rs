//! Note-type dispatch

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, warn};

use minote_core::{ExtraInfo, NoteDetail, NoteType};

use crate::error::MarkupResult;
use crate::node::parse;
use crate::normalize::normalize;
use crate::render::Renderer;

/// Remote file id -> local reference, rebuilt for every note
pub type LinkMap = HashMap<String, String>;

/// Prefix in front of the handwriting JSON payload
pub const HANDWRITE_SENTINEL: &str = "hw:json:";

#[derive(Debug, Deserialize)]
struct HandwritePayload {
    #[serde(default)]
    text: String,
}

/// Turns a note detail into a markdown body
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupTransformer;

impl MarkupTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform one note body.
    ///
    /// `title` feeds the mind-map heading; `links` must already hold every
    /// attachment that resolved for this note.
    pub fn transform(
        &self,
        detail: &NoteDetail,
        note_type: NoteType,
        title: &str,
        links: &LinkMap,
    ) -> MarkupResult<String> {
        let extra = ExtraInfo::parse(detail.extra_info.as_deref());
        match note_type {
            NoteType::Mind => Ok(self.transform_mind(&extra, title)),
            NoteType::Handwrite => Ok(self.transform_handwrite(detail, &extra, links)),
            NoteType::Common => self.transform_common(&detail.content, links),
        }
    }

    fn transform_common(&self, content: &str, links: &LinkMap) -> MarkupResult<String> {
        let normalized = normalize(content);
        let nodes = parse(&normalized)?;
        Ok(Renderer::new(links).render(&nodes))
    }

    fn transform_mind(&self, extra: &ExtraInfo, title: &str) -> String {
        let heading = extra.explicit_title().unwrap_or(title);
        let plain = extra
            .mind_content_plain_text
            .as_deref()
            .unwrap_or_default()
            .trim();
        if plain.is_empty() {
            format!("# {}\n", heading)
        } else {
            format!("# {}\n\n{}\n", heading, plain)
        }
    }

    fn transform_handwrite(&self, detail: &NoteDetail, extra: &ExtraInfo, links: &LinkMap) -> String {
        let mut body = extra
            .handwrite_data
            .as_deref()
            .map(handwrite_text)
            .unwrap_or_default();

        if let Some(digest) = extra.thumbnail_digest.as_deref().filter(|d| !d.is_empty()) {
            let owner = detail
                .attachments()
                .iter()
                .find(|att| att.digest.as_deref() == Some(digest));
            match owner.and_then(|att| links.get(&att.file_id)) {
                Some(link) => {
                    if !body.is_empty() {
                        body.push_str("\n\n");
                    }
                    if !link.starts_with('!') {
                        body.push('!');
                    }
                    body.push_str(link);
                }
                None => debug!("Thumbnail digest {} has no resolved attachment", digest),
            }
        }

        if body.is_empty() {
            body
        } else {
            format!("{}\n", body.trim_end())
        }
    }
}

/// Extract the text field from a handwriting payload; malformed data is empty.
fn handwrite_text(raw: &str) -> String {
    let json = raw.strip_prefix(HANDWRITE_SENTINEL).unwrap_or(raw);
    match serde_json::from_str::<HandwritePayload>(json) {
        Ok(payload) => payload.text.trim().to_string(),
        Err(e) => {
            warn!("Ignoring malformed handwriting payload: {}", e);
            String::new()
        }
    }
}
