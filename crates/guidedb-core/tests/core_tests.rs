use std::fs;
use std::io::Write;
use tempfile::TempDir;

use guidedb_core::config::{expand_path, resolve_with_base, Config, ProviderKind, Settings};
use guidedb_core::{snippet, CorpusReader, Error};

#[test]
fn read_dir_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let docs = CorpusReader::default().read_dir(dir).expect("read corpus");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "a.txt", "top-level files are identified by file name");
    assert_eq!(docs[0].text.trim(), "Short text");
}

#[test]
fn read_dir_is_sorted_and_filters_extension() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.txt"), "bravo").unwrap();
    fs::write(dir.join("a.TXT"), "alpha").unwrap();
    fs::write(dir.join("notes.pdf"), "binary").unwrap();
    fs::create_dir(dir.join("acc")).unwrap();
    fs::write(dir.join("acc").join("c.txt"), "charlie").unwrap();

    let docs = CorpusReader::default().read_dir(dir).expect("read corpus");
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();

    assert_eq!(ids, vec!["a.TXT", "acc/c.txt", "b.txt"]);
}

#[test]
fn read_dir_limited_two_files_limit_one() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta").unwrap();

    let docs = CorpusReader::default().read_dir_limited(dir, 1).expect("read limited");

    assert_eq!(docs.len(), 1, "limited to one source document");
    assert_eq!(docs[0].id, "a.txt");
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("x.txt"), [b'o', b'k', 0xff, b'!']).unwrap();

    let docs = CorpusReader::default().read_dir(tmp.path()).expect("read corpus");

    assert_eq!(docs[0].text, "ok\u{fffd}!");
}

#[test]
fn missing_corpus_dir_is_an_invalid_argument() {
    let tmp = TempDir::new().unwrap();
    let err = CorpusReader::default().read_dir(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn snippet_replaces_newlines_then_truncates() {
    assert_eq!(snippet("line1\nline2", 8), "line1 li");
}

#[test]
fn snippet_edge_lengths() {
    assert_eq!(snippet("abc", 0), "");
    assert_eq!(snippet("a\nb", 100), "a b");
}

#[test]
fn snippet_never_splits_a_character() {
    assert_eq!(snippet("Aortenwurzel-Ø größer", 14), "Aortenwurzel-Ø");
    assert_eq!(snippet("🫀🫀🫀", 2), "🫀🫀");
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("guidedb.toml");
    fs::write(
        &path,
        "[chunking]\noverlap = 100\n\n[embedding]\nprovider = \"hash\"\nhash_dim = 64\n",
    )
    .unwrap();

    let settings = Config::from_file(&path).unwrap().settings().unwrap();

    assert_eq!(settings.chunking.overlap, 100);
    assert_eq!(settings.chunking.max_chars, 5000, "untouched keys keep their defaults");
    assert_eq!(settings.embedding.provider, ProviderKind::Hash);
    assert_eq!(settings.embedding.hash_dim, 64);
    assert_eq!(settings.search.top_k, 5);
}

#[test]
fn config_rejects_overlap_not_below_window() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "[chunking]\nmax_chars = 100\noverlap = 100\n").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn default_settings_are_valid() {
    let settings = Settings::default();
    settings.validate().unwrap();
    assert_eq!(settings.index_path(), std::path::PathBuf::from("data/embeddings.bin"));
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/srv/guidedb");
    assert_eq!(resolve_with_base(base, "data/x.bin"), base.join("data/x.bin"));
    assert_eq!(resolve_with_base(base, "/abs/x.bin"), std::path::PathBuf::from("/abs/x.bin"));
    assert_eq!(expand_path("plain/path"), std::path::PathBuf::from("plain/path"));
}
