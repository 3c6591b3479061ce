use std::path::PathBuf;

use guidedb_core::{ChunkingConfig, CorpusReader, Embedder};
use guidedb_embed::HashEmbedder;
use guidedb_vector::{load, load_snapshot, save_snapshot, search, search_documents, IndexBuilder};
use tempfile::TempDir;

fn data_dir() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().to_path_buf();
    root.join("test_data/txt")
}

#[test]
fn corpus_build_save_load_search() {
    let docs = CorpusReader::default().read_dir(&data_dir()).expect("read corpus");
    eprintln!("read {} documents from {}", docs.len(), data_dir().display());
    assert_eq!(docs.len(), 3);

    let embedder = HashEmbedder::new(512);
    let cfg = ChunkingConfig::new(200, 40).unwrap();
    let out = IndexBuilder::new(&embedder, cfg).unwrap().workers(3).build(docs).expect("build");
    assert_eq!(out.records.len(), 3);
    assert!(out.report.skipped.is_empty());
    assert!(out.report.chunks_embedded > 3, "documents longer than the window produce several chunks");
    assert!(out.records.iter().all(|r| r.dim() == 512));

    let tmp = TempDir::new().expect("tmp");
    let index_path = tmp.path().join("embeddings.bin");
    save_snapshot(&out.records, &index_path, embedder.embedder_id()).expect("save");
    let records = load(&index_path).expect("load");
    assert_eq!(records, out.records);
    assert_eq!(load_snapshot(&index_path).unwrap().meta.embedder_id, "hash:d512");

    let hits = search("genetic testing pathogenic variant", &records, &embedder, 3).expect("search");
    eprintln!("search -> {:?}", hits.iter().map(|h| (&h.record.file, h.score)).collect::<Vec<_>>());
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].record.file, "genetic_testing.txt");
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));

    let api_hits = search_documents("smoking exercise lifting", &index_path, &embedder, 1, 40).expect("search api");
    assert_eq!(api_hits.len(), 1);
    assert_eq!(api_hits[0].file, "cardiology/lifestyle.txt");
    assert!(api_hits[0].snippet.chars().count() <= 40);
    assert!(!api_hits[0].snippet.contains('\n'));
}
