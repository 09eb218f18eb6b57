//! Normalization passes
//!
//! Passes run in table order and later passes rely on earlier ones:
//! `line-break` only sees newlines that `block-close` did not already
//! consume, and the attachment passes expect the sentinel to be gone.

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder element every attachment form is folded into
pub const ATTACHMENT_TAG: &str = "attachment";

struct Pass {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Pass {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            replacement,
        }
    }
}

static PASSES: Lazy<Vec<Pass>> = Lazy::new(|| {
    vec![
        Pass::new("crlf", r"\r\n?", "\n"),
        // 1. block markup
        Pass::new("empty-block", r"<text\b[^>]*>[ \t]*</text>\n?", "<p><br/></p>"),
        Pass::new("block-open", r"<text\b[^>]*>", "<p>"),
        Pass::new("block-close", r"</text>\n?", "</p>"),
        // 2. no-op formatting sentinel
        Pass::new("format-sentinel", r"<new-format\s*/>\n?", ""),
        // 3. attachments
        Pass::new(
            "sound",
            r#"<sound\b[^>]*?\bfileid="([^"]+)"[^>]*?/?>"#,
            r#"<attachment fileid="${1}"/>"#,
        ),
        Pass::new(
            "image",
            r#"<img\b[^>]*?\bfileid="([^"]+)"[^>]*?/?>"#,
            r#"<attachment fileid="${1}"/>"#,
        ),
        Pass::new(
            "legacy-image",
            r"☺[ \t]+([^<\s]+)(?:<0/></>)?",
            r#"<attachment fileid="${1}"/>"#,
        ),
        // 4. remaining raw line breaks
        Pass::new("line-break", r"\n", "<br/>"),
    ]
});

/// Run every pass in order over a raw note body.
pub fn normalize(raw: &str) -> String {
    PASSES.iter().fold(raw.to_string(), |text, pass| {
        let rewritten = pass.pattern.replace_all(&text, pass.replacement);
        if rewritten != text {
            tracing::trace!(pass = pass.name, "normalization pass rewrote body");
        }
        rewritten.into_owned()
    })
}
