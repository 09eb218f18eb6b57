//! YAML preamble
//!
//! Aliases are only emitted for notes that carried an explicit title, so
//! synthetic fallback titles never end up in alias metadata.

use chrono::{Local, SecondsFormat, TimeZone};
use serde::Serialize;

use crate::error::{MarkupError, MarkupResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
    pub minote_id: String,
}

impl FrontMatter {
    pub fn new(id: impl Into<String>, created_ms: i64, modified_ms: i64) -> Self {
        Self {
            aliases: Vec::new(),
            tags: Vec::new(),
            created: local_timestamp(created_ms),
            updated: local_timestamp(modified_ms),
            minote_id: id.into(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn to_yaml(&self) -> MarkupResult<String> {
        serde_yaml::to_string(self).map_err(|e| MarkupError::FrontMatter(e.to_string()))
    }
}

/// Prepend the preamble to a rendered body.
pub fn compose_document(front_matter: &FrontMatter, body: &str) -> MarkupResult<String> {
    let yaml = front_matter.to_yaml()?;
    Ok(format!("---\n{}---\n\n{}", yaml, body))
}

/// RFC 3339 in the local offset; out-of-range values render empty.
fn local_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
        .unwrap_or_default()
}
