//! guidedb-text
//!
//! Keyword search over the paragraphs of the indexed documents, backed by an
//! in-memory Tantivy index. Independent of the vector snapshot.
pub mod index;
pub mod tantivy_utils;

pub use index::{ParagraphHit, ParagraphIndex, DEFAULT_PER_SOURCE_LIMIT};
pub use tantivy_utils::split_paragraphs;
