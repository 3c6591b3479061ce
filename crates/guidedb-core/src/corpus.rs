use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::CorpusDocument;

/// Reads a directory of plain-text documents, one file per document.
#[derive(Debug, Clone)]
pub struct CorpusReader {
    extension: String,
}

impl Default for CorpusReader {
    fn default() -> Self {
        Self { extension: "txt".to_string() }
    }
}

impl CorpusReader {
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self { extension: extension.trim_start_matches('.').to_string() }
    }

    pub fn read_dir(&self, data_dir: &Path) -> Result<Vec<CorpusDocument>> {
        self.read_files(data_dir, None)
    }

    pub fn read_dir_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<CorpusDocument>> {
        self.read_files(data_dir, Some(limit))
    }

    fn read_files(&self, data_dir: &Path, limit: Option<usize>) -> Result<Vec<CorpusDocument>> {
        if !data_dir.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "corpus directory {} does not exist",
                data_dir.display()
            )));
        }
        let mut files = self.list_files(data_dir);
        if files.is_empty() {
            info!(dir = %data_dir.display(), extension = %self.extension, "no documents found");
            return Ok(vec![]);
        }
        if let Some(limit) = limit {
            if files.len() > limit {
                files.truncate(limit);
                info!(limit, "limited corpus to first files");
            }
        }
        let documents = collect_documents(data_dir, &files, read_file_content);
        info!(documents = documents.len(), dir = %data_dir.display(), "read corpus");
        Ok(documents)
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension));
            if matches {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        files
    }
}

/// Read every file with `read`; a file that cannot be read is logged and
/// left out instead of failing the whole corpus.
fn collect_documents<F>(data_dir: &Path, files: &[PathBuf], read: F) -> Vec<CorpusDocument>
where
    F: Fn(&Path) -> Result<String>,
{
    let mut documents = Vec::with_capacity(files.len());
    for (file_index, file_path) in files.iter().enumerate() {
        debug!("reading file {}/{}: {}", file_index + 1, files.len(), file_path.display());
        match read(file_path) {
            Ok(text) => {
                let id = document_id(file_path, data_dir);
                documents.push(CorpusDocument { id, path: file_path.clone(), text });
            }
            Err(err) => warn!(file = %file_path.display(), error = %err, "skipping unreadable file"),
        }
    }
    documents
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

/// Path relative to the corpus root, always with `/` separators.
fn document_id(file_path: &Path, data_dir: &Path) -> String {
    let relative = file_path.strip_prefix(data_dir).unwrap_or(file_path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
