use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn data_dir() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().to_path_buf();
    root.join("test_data/txt")
}

fn guidedb(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_guidedb"))
        .current_dir(cwd)
        .env("APP_USE_FAKE_EMBEDDINGS", "1")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("run guidedb")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

#[test]
fn build_search_keyword_export() {
    let tmp = TempDir::new().unwrap();
    let corpus = data_dir();
    let corpus = corpus.to_str().unwrap();

    let out = guidedb(tmp.path(), &["build", "--corpus", corpus, "--index", "idx/embeddings.bin"]);
    assert!(out.status.success(), "build failed: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout(&out).contains("Indexed 3 of 3 documents"));
    assert!(tmp.path().join("idx/embeddings.bin").exists());

    let out = guidedb(tmp.path(), &["search", "pathogenic variant genetic testing", "--index", "idx/embeddings.bin", "--json", "--top-k", "2"]);
    assert!(out.status.success());
    let hits: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 2);
    assert_eq!(hits[0]["file"], "genetic_testing.txt");

    let out = guidedb(tmp.path(), &["keyword", "marfan", "--index", "idx/embeddings.bin"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("[aortic_surveillance.txt]"));

    let out = guidedb(tmp.path(), &["export", "--index", "idx/embeddings.bin", "--output", "embeddings.json"]);
    assert!(out.status.success());
    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(tmp.path().join("embeddings.json")).unwrap()).unwrap();
    assert_eq!(exported.as_array().unwrap().len(), 3);
}

#[test]
fn empty_corpus_writes_empty_index() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("corpus")).unwrap();

    let out = guidedb(tmp.path(), &["build", "--corpus", "corpus", "--index", "empty.bin"]);
    assert!(out.status.success());

    let out = guidedb(tmp.path(), &["search", "anything", "--index", "empty.bin"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "No results found.");
}

#[test]
fn missing_index_is_an_error() {
    let tmp = TempDir::new().unwrap();

    let out = guidedb(tmp.path(), &["search", "anything", "--index", "nope.bin"]);

    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Index not found"));
}

#[test]
fn bad_chunking_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("bad.toml"), "[chunking]\nmax_chars = 100\noverlap = 100\n").unwrap();

    let out = guidedb(tmp.path(), &["--config", "bad.toml", "search", "x"]);

    assert!(!out.status.success());
}
