use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use guidedb_core::DocumentRecord;

#[derive(Serialize)]
struct ExportedEmbedding<'a> {
    file: &'a str,
    embedding: &'a [f32],
}

/// Dump `{file, embedding}` pairs as a pretty JSON array.
pub fn export_embeddings(records: &[DocumentRecord], path: &Path) -> Result<()> {
    let rows: Vec<ExportedEmbedding<'_>> = records
        .iter()
        .map(|r| ExportedEmbedding { file: &r.file, embedding: &r.vector })
        .collect();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &rows)
        .with_context(|| format!("failed to write embeddings to {}", path.display()))?;
    writer.flush()?;
    info!(path = %path.display(), documents = records.len(), "exported embeddings");
    Ok(())
}
