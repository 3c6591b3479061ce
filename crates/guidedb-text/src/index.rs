use std::collections::HashMap;

use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument};
use tracing::{debug, info};

use guidedb_core::{CorpusDocument, DocumentRecord, Error};

use crate::tantivy_utils::{
	build_schema, register_tokenizer, split_paragraphs, ORDINAL_FIELD, PARAGRAPH_FIELD, SOURCE_FIELD,
};

pub const DEFAULT_PER_SOURCE_LIMIT: usize = 3;

const WRITER_HEAP_BYTES: usize = 50_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphHit {
	pub source: String,
	pub paragraph: String,
	pub score: f32,
}

/// In-memory full-text index over the paragraphs of a corpus.
///
/// A paragraph matches when it contains the search term as a
/// case-insensitive substring. Tantivy's BM25 score over the term's words
/// orders the matches; paragraphs that only match inside a word score zero.
pub struct ParagraphIndex {
	index: Index,
	reader: IndexReader,
	paragraph_field: Field,
	ordinal_field: Field,
	/// `(source, paragraph)` in insertion order, addressed by ordinal.
	paragraphs: Vec<(String, String)>,
	per_source_limit: usize,
}

impl ParagraphIndex {
	pub fn from_records(records: &[DocumentRecord]) -> Result<Self> {
		Self::build(records.iter().map(|r| (r.file.as_str(), r.text.as_str())))
	}

	pub fn from_documents(documents: &[CorpusDocument]) -> Result<Self> {
		Self::build(documents.iter().map(|d| (d.id.as_str(), d.text.as_str())))
	}

	fn build<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let source_field = schema.get_field(SOURCE_FIELD)?;
		let paragraph_field = schema.get_field(PARAGRAPH_FIELD)?;
		let ordinal_field = schema.get_field(ORDINAL_FIELD)?;

		let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
		let mut paragraphs = Vec::new();
		let mut documents = 0usize;
		for (source, text) in sources {
			documents += 1;
			for paragraph in split_paragraphs(text) {
				writer.add_document(doc!(
					source_field => source.to_string(),
					paragraph_field => paragraph.to_string(),
					ordinal_field => paragraphs.len() as u64,
				))?;
				paragraphs.push((source.to_string(), paragraph.to_string()));
			}
		}
		writer.commit()?;
		let reader = index.reader()?;
		info!(documents, paragraphs = paragraphs.len(), "built paragraph index");

		Ok(Self {
			index,
			reader,
			paragraph_field,
			ordinal_field,
			paragraphs,
			per_source_limit: DEFAULT_PER_SOURCE_LIMIT,
		})
	}

	/// Cap on paragraphs returned from any one document.
	pub fn with_per_source_limit(mut self, limit: usize) -> Self {
		self.per_source_limit = limit.max(1);
		self
	}

	pub fn paragraph_count(&self) -> usize {
		self.paragraphs.len()
	}

	/// Paragraphs matching `term`, best first.
	pub fn search(&self, term: &str, max_results: usize) -> Result<Vec<ParagraphHit>> {
		let term = term.trim();
		if term.is_empty() {
			return Err(Error::InvalidArgument("search term must not be empty".to_string()).into());
		}
		if max_results == 0 {
			return Err(Error::InvalidArgument("max_results must be greater than zero".to_string()).into());
		}
		if self.paragraphs.is_empty() {
			return Ok(vec![]);
		}

		let scores = self.word_scores(term)?;
		let needle = term.to_lowercase();
		let mut matches: Vec<(usize, f32)> = self
			.paragraphs
			.iter()
			.enumerate()
			.filter(|(_, (_, paragraph))| paragraph.to_lowercase().contains(&needle))
			.map(|(ordinal, _)| (ordinal, scores.get(&(ordinal as u64)).copied().unwrap_or(0.0)))
			.collect();
		// Stable, so equal scores keep corpus order.
		matches.sort_by(|a, b| b.1.total_cmp(&a.1));

		let mut per_source: HashMap<&str, usize> = HashMap::new();
		let mut hits = Vec::new();
		for (ordinal, score) in matches {
			let (source, paragraph) = &self.paragraphs[ordinal];
			let taken = per_source.entry(source.as_str()).or_insert(0);
			if *taken >= self.per_source_limit {
				continue;
			}
			*taken += 1;
			hits.push(ParagraphHit { source: source.clone(), paragraph: paragraph.clone(), score });
			if hits.len() == max_results {
				break;
			}
		}
		debug!(term, hits = hits.len(), "keyword search");
		Ok(hits)
	}

	/// BM25 score of every paragraph holding all the words of `term`, keyed
	/// by ordinal.
	fn word_scores(&self, term: &str) -> Result<HashMap<u64, f32>> {
		let searcher = self.reader.searcher();
		let mut parser = QueryParser::for_index(&self.index, vec![self.paragraph_field]);
		parser.set_conjunction_by_default();
		let (query, errors) = parser.parse_query_lenient(term);
		if !errors.is_empty() {
			debug!(term, errors = errors.len(), "lenient query parse dropped parts of the term");
		}
		let top_docs = searcher.search(&query, &TopDocs::with_limit(self.paragraphs.len()))?;

		let mut scores = HashMap::with_capacity(top_docs.len());
		for (score, address) in top_docs {
			let doc: TantivyDocument = searcher.doc(address)?;
			if let Some(ordinal) = doc.get_first(self.ordinal_field).and_then(|v| v.as_u64()) {
				scores.insert(ordinal, score);
			}
		}
		Ok(scores)
	}
}
