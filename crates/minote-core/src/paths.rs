//! Helpers for mirror-relative paths.
//!
//! Storage paths are `/`-separated strings relative to the mirror root, the
//! same way a vault addresses its files.

/// Join path segments, skipping empty ones.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory portion of a relative path (`""` for top-level files).
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Rewrite a leading folder segment `old` to `new`.
///
/// Returns `None` when `path` does not live under `old`.
pub fn replace_prefix(path: &str, old: &str, new: &str) -> Option<String> {
    let rest = path.strip_prefix(old)?.strip_prefix('/')?;
    Some(join(&[new, rest]))
}
