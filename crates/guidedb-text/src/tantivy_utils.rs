use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TOKENIZER: &str = "text_with_stopwords";
pub const SOURCE_FIELD: &str = "source";
pub const PARAGRAPH_FIELD: &str = "paragraph";
/// Position of the paragraph in insertion order.
pub const ORDINAL_FIELD: &str = "ordinal";

/// English function words that carry no weight in guideline text.
pub const STOP_WORDS: &[&str] = &[
	"a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on",
	"that", "the", "to", "was", "will", "with", "or", "but", "not", "this", "these", "they", "them", "their", "there",
	"then", "than", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could",
	"should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_text_field(SOURCE_FIELD, STRING | STORED);
	let paragraph_indexing = TextFieldIndexing::default()
		.set_tokenizer(TOKENIZER)
		.set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let paragraph_options = TextOptions::default().set_indexing_options(paragraph_indexing).set_stored();
	schema_builder.add_text_field(PARAGRAPH_FIELD, paragraph_options);
	schema_builder.add_u64_field(ORDINAL_FIELD, STORED);
	schema_builder.build()
}

pub fn paragraph_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(STOP_WORDS.iter().map(|s| s.to_string())))
		.build()
}

pub fn register_tokenizer(index: &Index) {
	index.tokenizers().register(TOKENIZER, paragraph_analyzer());
}

/// Blank-line separated paragraphs, trimmed, empties dropped.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
	text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()).collect()
}
