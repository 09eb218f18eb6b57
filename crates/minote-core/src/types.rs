//! Domain and wire types
//!
//! Wire types mirror the remote JSON (camelCase, ids that may arrive as
//! numbers or strings). Domain types are what the sync engine reasons about.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Reserved folder id for notes without a folder
pub const UNCATEGORIZED_FOLDER_ID: &str = "0";

/// Ledger record kind for notes
pub const LEDGER_KIND_NOTE: &str = "note";

// ============================================================================
// Domain types
// ============================================================================

/// Note variant, selected by `extraInfo.note_content_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum NoteType {
    /// Rich-text markup body
    #[default]
    Common,
    /// Mind map with a plain-text rendering
    Mind,
    /// Handwriting with an embedded JSON text payload
    Handwrite,
}

impl NoteType {
    /// Parse the remote type label; unknown labels fall back to `Common`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("mind") => NoteType::Mind,
            Some("handwrite") => NoteType::Handwrite,
            _ => NoteType::Common,
        }
    }

    /// Label used in tags
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::Common => "common",
            NoteType::Mind => "mind",
            NoteType::Handwrite => "handwrite",
        }
    }
}

/// A note as materialized by one catalog walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    /// Sanitized title, safe as a file stem
    pub title: String,
    /// Whether the title came from the source metadata rather than a snippet
    pub has_explicit_title: bool,
    pub note_type: NoteType,
    /// Remote creation time, epoch milliseconds
    pub create_date: i64,
    /// Remote modification time, epoch milliseconds; the sync watermark
    pub modify_date: i64,
    pub folder_id: String,
}

/// A remote folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub create_date: i64,
}

/// Per-note persisted sync state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Title the note was written under
    pub name: String,
    /// Remote `modifyDate` at the last successful sync
    pub sync_time: i64,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default)]
    pub folder_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}

impl LedgerRecord {
    /// Build a record for a note that was just written
    pub fn for_note(note: &Note, relative_path: String, folder_name: String) -> Self {
        Self {
            id: note.id.clone(),
            kind: LEDGER_KIND_NOTE.to_string(),
            name: note.title.clone(),
            sync_time: note.modify_date,
            relative_path,
            folder_name,
            folder_id: Some(note.folder_id.clone()),
        }
    }

    pub fn is_note(&self) -> bool {
        self.kind == LEDGER_KIND_NOTE
    }
}

/// Binary attached to a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    #[serde(deserialize_with = "de_id")]
    pub file_id: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub digest: Option<String>,
}

impl AttachmentDescriptor {
    /// File extension from the MIME subtype (`image/jpeg` -> `jpeg`).
    pub fn extension(&self) -> String {
        let essence = self.mime_type.split(';').next().unwrap_or_default().trim();
        let subtype = essence.rsplit('/').next().unwrap_or_default();
        let subtype = subtype.split('+').next().unwrap_or_default();
        let cleaned: String = subtype
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if cleaned.is_empty() || !essence.contains('/') {
            "bin".to_string()
        } else {
            cleaned
        }
    }

    /// Deterministic local file name for this attachment.
    pub fn local_file_name(&self) -> String {
        let stem: String = self
            .file_id
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        format!("{}.{}", stem, self.extension())
    }
}

/// Structured metadata carried as a JSON string in `extraInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraInfo {
    pub title: Option<String>,
    pub note_content_type: Option<String>,
    pub mind_content_plain_text: Option<String>,
    pub handwrite_data: Option<String>,
    pub thumbnail_digest: Option<String>,
}

impl ExtraInfo {
    /// Parse `extraInfo`; absent or malformed JSON yields empty metadata.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ExtraInfo::default(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed extraInfo: {}", e);
                ExtraInfo::default()
            }),
        }
    }

    pub fn note_type(&self) -> NoteType {
        NoteType::from_label(self.note_content_type.as_deref())
    }

    /// Non-blank explicit title
    pub fn explicit_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// One page of the remote catalog
///
/// Entries stay as raw JSON so a single malformed entry can be skipped
/// without failing the whole page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    #[serde(default)]
    pub folders: Vec<serde_json::Value>,
    #[serde(default)]
    pub last_page: bool,
    /// Cursor for the next page
    #[serde(default)]
    pub sync_tag: Option<String>,
}

/// Catalog entry of kind `note`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNoteEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub extra_info: Option<String>,
    #[serde(default = "uncategorized", deserialize_with = "de_id")]
    pub folder_id: String,
    #[serde(default)]
    pub create_date: i64,
    pub modify_date: i64,
}

/// Catalog entry of kind `folder`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFolderEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub create_date: i64,
}

/// Full note as returned by the detail endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDetail {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub extra_info: Option<String>,
    #[serde(default)]
    pub setting: Option<NoteSetting>,
    #[serde(default)]
    pub create_date: i64,
    #[serde(default)]
    pub modify_date: i64,
}

impl NoteDetail {
    pub fn attachments(&self) -> &[AttachmentDescriptor] {
        self.setting.as_ref().map(|s| s.data.as_slice()).unwrap_or(&[])
    }
}

/// Attachment list container of a note detail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteSetting {
    #[serde(default)]
    pub data: Vec<AttachmentDescriptor>,
}

fn uncategorized() -> String {
    UNCATEGORIZED_FOLDER_ID.to_string()
}

/// Ids arrive as JSON numbers or strings depending on the endpoint.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Str(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Str(s) => s,
        IdRepr::Signed(n) => n.to_string(),
        IdRepr::Unsigned(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_note_entry_accepts_numeric_ids() {
        let entry: RawNoteEntry = serde_json::from_value(json!({
            "id": 42,
            "type": "note",
            "snippet": "hello",
            "folderId": 7,
            "createDate": 1,
            "modifyDate": 2
        }))
        .unwrap();
        assert_eq!(entry.id, "42");
        assert_eq!(entry.folder_id, "7");
    }

    #[test]
    fn test_note_entry_defaults_folder() {
        let entry: RawNoteEntry = serde_json::from_value(json!({
            "id": "9",
            "type": "note",
            "modifyDate": 2
        }))
        .unwrap();
        assert_eq!(entry.folder_id, UNCATEGORIZED_FOLDER_ID);
        assert_eq!(entry.snippet, "");
    }

    #[test]
    fn test_extension_from_mime() {
        let mut att = AttachmentDescriptor {
            file_id: "1.abc".to_string(),
            mime_type: "image/jpeg".to_string(),
            digest: None,
        };
        assert_eq!(att.extension(), "jpeg");
        assert_eq!(att.local_file_name(), "1.abc.jpeg");

        att.mime_type = "image/svg+xml; charset=utf-8".to_string();
        assert_eq!(att.extension(), "svg");

        att.mime_type = "garbage".to_string();
        assert_eq!(att.extension(), "bin");
    }

    #[test]
    fn test_extra_info_tolerates_garbage() {
        assert_eq!(ExtraInfo::parse(Some("{not json")), ExtraInfo::default());
        assert_eq!(ExtraInfo::parse(None), ExtraInfo::default());

        let extra = ExtraInfo::parse(Some(r#"{"title":"  ","note_content_type":"mind"}"#));
        assert_eq!(extra.explicit_title(), None);
        assert_eq!(extra.note_type(), NoteType::Mind);
    }

    #[test]
    fn test_ledger_record_reads_legacy_shape() {
        let record: LedgerRecord = serde_json::from_value(json!({
            "id": "1",
            "type": "note",
            "name": "Old",
            "syncTime": 100
        }))
        .unwrap();
        assert!(record.is_note());
        assert_eq!(record.relative_path, "");
        assert_eq!(record.folder_id, None);
    }

    #[test]
    fn test_detail_without_setting_has_no_attachments() {
        let detail: NoteDetail = serde_json::from_value(json!({"content": "x"})).unwrap();
        assert!(detail.attachments().is_empty());
    }
}
