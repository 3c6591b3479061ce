use std::env;
use std::path::PathBuf;

use anyhow::Result;
use guidedb_core::{ChunkingConfig, CorpusReader, Embedder};
use guidedb_embed::HashEmbedder;
use guidedb_vector::{render_chat_context, save_snapshot, search_documents, IndexBuilder};

// Usage: cargo run -p guidedb-vector --example build_and_search -- [corpus_dir] [query]
fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let corpus = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("test_data/txt"));
    let query = args.next().unwrap_or_else(|| "aortic diameter surgery threshold".to_string());

    let docs = CorpusReader::default().read_dir(&corpus)?;
    let embedder = HashEmbedder::new(1024);
    let out = IndexBuilder::new(&embedder, ChunkingConfig::default())?.progress(true).build(docs)?;
    println!("indexed {} documents ({} skipped)", out.records.len(), out.report.skipped.len());

    let dir = tempfile::tempdir()?;
    let index_path = dir.path().join("embeddings.bin");
    save_snapshot(&out.records, &index_path, embedder.embedder_id())?;

    let hits = search_documents(&query, &index_path, &embedder, 3, 160)?;
    if hits.is_empty() {
        println!("No results found.");
    } else {
        println!("{}", render_chat_context(&hits));
    }
    Ok(())
}
