//! Mi Notes markup transformer
//!
//! Converts the proprietary rich-text dialect into markdown in two stages:
//!
//! 1. **Normalize** ([`normalize`]): an ordered table of raw-text passes that
//!    turns block tags into paragraphs, drops the format sentinel, folds every
//!    attachment form into one `<attachment fileid=".."/>` placeholder and
//!    makes line breaks explicit.
//! 2. **Convert** ([`node`], [`rules`], [`render`]): the normalized text is
//!    parsed into a node tree and rendered by a visitor that applies the first
//!    matching rule from an ordered rule table.
//!
//! Mind-map and handwriting notes bypass the markup stages
//! ([`MarkupTransformer::transform`] dispatches on [`minote_core::NoteType`]).
//! [`FrontMatter`] renders the YAML preamble prepended to every document.

pub mod error;
pub mod frontmatter;
pub mod node;
pub mod normalize;
pub mod render;
pub mod rules;
pub mod transform;

pub use error::{MarkupError, MarkupResult};
pub use frontmatter::{compose_document, FrontMatter};
pub use node::{parse, Element, Node};
pub use normalize::normalize;
pub use render::Renderer;
pub use transform::{LinkMap, MarkupTransformer, HANDWRITE_SENTINEL};
