//! Response envelopes

use serde::Deserialize;

use minote_core::NoteDetail;

/// Every JSON endpoint wraps its payload as `{code, result, data}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn message(&self) -> String {
        self.description
            .clone()
            .or_else(|| self.result.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailData {
    pub entry: NoteDetail,
}
