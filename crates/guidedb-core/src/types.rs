//! Domain types shared by the builder, the store and the search engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One source document of the corpus.
///
/// - `id`: stable identifier surfaced in results (path relative to the corpus root)
/// - `path`: where the text was read from
/// - `text`: full document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub id: String,
    pub path: PathBuf,
    pub text: String,
}

impl CorpusDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let id = id.into();
        Self { path: PathBuf::from(&id), id, text: text.into() }
    }
}

/// One indexed document: its identifier, original text and the mean of its
/// chunk embeddings. All records of one index share the vector length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file: String,
    pub text: String,
    pub vector: Vec<f32>,
}

impl DocumentRecord {
    pub fn dim(&self) -> usize {
        self.vector.len()
    }
}

/// The caller-facing shape of a search result.
///
/// `score` is the cosine similarity in `[-1, 1]`; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub file: String,
    pub score: f32,
    pub snippet: String,
}
