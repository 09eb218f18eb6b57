//! Note title derivation
//!
//! Titles double as file stems, so they are stripped of markup and of the
//! characters that are illegal in file names on common platforms.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ExtraInfo, NoteType};

/// Maximum characters taken from a snippet when no explicit title exists
pub const SNIPPET_TITLE_CHARS: usize = 50;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static ILLEGAL_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|\r\n]"#).unwrap());

/// Derived title plus whether it came from source metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedTitle {
    pub title: String,
    pub explicit: bool,
}

/// Derive a note title from its metadata or snippet.
///
/// An explicit metadata title wins unless nothing of it survives
/// sanitizing. Otherwise the first line of the snippet
/// (of the plain-text rendering for mind maps), cut to
/// [`SNIPPET_TITLE_CHARS`] characters and suffixed with `_<id>`.
pub fn derive_title(id: &str, extra: &ExtraInfo, snippet: &str) -> DerivedTitle {
    if let Some(title) = extra.explicit_title().map(sanitize_title) {
        if !title.is_empty() {
            return DerivedTitle {
                title,
                explicit: true,
            };
        }
    }

    let source = match extra.note_type() {
        NoteType::Mind => extra.mind_content_plain_text.as_deref().unwrap_or(snippet),
        _ => snippet,
    };
    let first_line: String = source
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(SNIPPET_TITLE_CHARS)
        .collect();

    DerivedTitle {
        title: sanitize_title(&format!("{}_{}", first_line, id)),
        explicit: false,
    }
}

/// Strip HTML tags and path-illegal characters, then trim.
pub fn sanitize_title(raw: &str) -> String {
    let without_tags = HTML_TAG_RE.replace_all(raw, "");
    ILLEGAL_CHARS_RE
        .replace_all(&without_tags, "")
        .trim()
        .to_string()
}
