//! Per-run outcome

use std::fmt;

/// A note that could not be written this run; it is retried next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFailure {
    pub id: String,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Notes written this run
    pub synced: usize,
    /// Notes whose watermark was current
    pub skipped: usize,
    pub failed: Vec<NoteFailure>,
    pub attachments_downloaded: usize,
    pub attachments_failed: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.attachments_failed == 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} synced, {} skipped, {} failed; {} attachments downloaded, {} failed",
            self.synced,
            self.skipped,
            self.failed.len(),
            self.attachments_downloaded,
            self.attachments_failed
        )
    }
}
