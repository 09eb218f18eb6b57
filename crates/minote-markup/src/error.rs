//! Markup error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    #[error("Unterminated tag starting at byte {offset}")]
    UnterminatedTag { offset: usize },

    #[error("Front matter serialization failed: {0}")]
    FrontMatter(String),
}

pub type MarkupResult<T> = Result<T, MarkupError>;
