//! Core of the guideline retrieval engine: domain types, the error taxonomy,
//! configuration, the chunker, the snippet formatter and the corpus reader.

pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod snippet;
pub mod traits;
pub mod types;

pub use chunker::{chunk, chunk_spans, chunk_with, ChunkSpan, ChunkingConfig};
pub use corpus::CorpusReader;
pub use error::{Error, Result};
pub use snippet::snippet;
pub use traits::{Embedder, FnEmbedder};
pub use types::{CorpusDocument, DocumentRecord, SearchHit};
