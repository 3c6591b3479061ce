//! On-disk snapshot of a built index.
//!
//! One bincode file holding metadata and the full record list. Writes go to a
//! temp file next to the target and are renamed over it, so a reader sees
//! either the previous snapshot or the new one.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use guidedb_core::{DocumentRecord, Error, Result};

pub const FORMAT_VERSION: u32 = 1;

const UNKNOWN_EMBEDDER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub format_version: u32,
    pub embedder_id: String,
    pub dimension: usize,
    pub documents: usize,
    pub built_at: DateTime<Utc>,
    /// blake3 hex digest of the encoded records.
    pub checksum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub meta: SnapshotMeta,
    pub records: Vec<DocumentRecord>,
}

pub fn save(records: &[DocumentRecord], path: &Path) -> Result<SnapshotMeta> {
    save_snapshot(records, path, UNKNOWN_EMBEDDER)
}

/// Write `records` to `path`, tagging the snapshot with the embedder that
/// produced the vectors.
pub fn save_snapshot(records: &[DocumentRecord], path: &Path, embedder_id: &str) -> Result<SnapshotMeta> {
    let dimension = common_dimension(records)?;
    let encoded_records = encode(&records)?;
    let meta = SnapshotMeta {
        format_version: FORMAT_VERSION,
        embedder_id: embedder_id.to_string(),
        dimension,
        documents: records.len(),
        built_at: Utc::now(),
        checksum: blake3::hash(&encoded_records).to_hex().to_string(),
    };
    let snapshot = IndexSnapshotRef { meta: &meta, records };
    let bytes = encode(&snapshot)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    info!(
        path = %path.display(),
        documents = meta.documents,
        dimension = meta.dimension,
        bytes = bytes.len(),
        "saved index snapshot"
    );
    Ok(meta)
}

pub fn load(path: &Path) -> Result<Vec<DocumentRecord>> {
    Ok(load_snapshot(path)?.records)
}

pub fn load_snapshot(path: &Path) -> Result<IndexSnapshot> {
    if !path.exists() {
        return Err(Error::IndexNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(Error::IndexCorrupt(format!("{} is not a snapshot file", path.display())));
    }
    let bytes = fs::read(path)?;
    let snapshot: IndexSnapshot = bincode::deserialize(&bytes)
        .map_err(|e| Error::IndexCorrupt(format!("{}: {}", path.display(), e)))?;
    verify(&snapshot)?;
    debug!(
        path = %path.display(),
        documents = snapshot.records.len(),
        embedder = %snapshot.meta.embedder_id,
        "loaded index snapshot"
    );
    Ok(snapshot)
}

fn verify(snapshot: &IndexSnapshot) -> Result<()> {
    let meta = &snapshot.meta;
    if meta.format_version != FORMAT_VERSION {
        return Err(Error::IndexCorrupt(format!(
            "unsupported snapshot format version {}",
            meta.format_version
        )));
    }
    if meta.documents != snapshot.records.len() {
        return Err(Error::IndexCorrupt(format!(
            "header lists {} documents but {} records are present",
            meta.documents,
            snapshot.records.len()
        )));
    }
    if let Some(bad) = snapshot.records.iter().find(|r| r.dim() != meta.dimension) {
        return Err(Error::IndexCorrupt(format!(
            "record {} has {} dimensions, expected {}",
            bad.file,
            bad.dim(),
            meta.dimension
        )));
    }
    let digest = blake3::hash(&encode(&snapshot.records)?).to_hex().to_string();
    if digest != meta.checksum {
        return Err(Error::IndexCorrupt("record checksum mismatch".to_string()));
    }
    Ok(())
}

/// Borrowing twin of [`IndexSnapshot`] so saving never clones the records.
#[derive(Serialize)]
struct IndexSnapshotRef<'a> {
    meta: &'a SnapshotMeta,
    records: &'a [DocumentRecord],
}

fn common_dimension(records: &[DocumentRecord]) -> Result<usize> {
    let Some(first) = records.first() else {
        return Ok(0);
    };
    let dimension = first.dim();
    match records.iter().find(|r| r.dim() != dimension) {
        Some(other) => Err(Error::EmbeddingDimension { expected: dimension, actual: other.dim() }),
        None => Ok(dimension),
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| Error::IndexCorrupt(format!("failed to encode snapshot: {}", e)))
}
