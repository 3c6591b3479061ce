//! Corpus → chunks → embeddings → one mean vector per document.
//!
//! Every chunk embedding is kept as its own `Result`, so one failed provider
//! call only costs that chunk. The per-document mean is taken once all of a
//! document's chunks have come back from the worker pool.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use guidedb_core::chunker::{chunk_with, ChunkingConfig};
use guidedb_core::{CorpusDocument, DocumentRecord, Embedder, Error, Result};

use crate::math::mean_vector;

pub const DEFAULT_WORKERS: usize = 4;

/// Outcome of embedding a single chunk.
pub type ChunkOutcome = Result<Vec<f32>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkFailure {
    pub file: String,
    pub chunk_index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The document had no text, so there was nothing to embed.
    NoText,
    /// Every chunk embedding failed.
    NoEmbeddings { failed_chunks: usize },
    /// Chunk vectors disagree with each other or with the index.
    Dimension { expected: usize, actual: usize },
    /// Another document with the same identifier was already indexed.
    DuplicateFile,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoText => write!(f, "document is empty"),
            SkipReason::NoEmbeddings { failed_chunks } => {
                write!(f, "no embeddings generated ({} chunks failed)", failed_chunks)
            }
            SkipReason::Dimension { expected, actual } => {
                write!(f, "embedding dimension mismatch: expected {}, got {}", expected, actual)
            }
            SkipReason::DuplicateFile => write!(f, "duplicate document identifier"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub documents_seen: usize,
    pub documents_indexed: usize,
    pub chunks_embedded: usize,
    pub skipped: Vec<SkippedDocument>,
    pub chunk_failures: Vec<ChunkFailure>,
    /// Dimensionality shared by every record produced.
    pub dimension: Option<usize>,
    /// The build stopped early because the cancel flag was raised.
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub records: Vec<DocumentRecord>,
    pub report: BuildReport,
}

pub struct IndexBuilder<'a> {
    embedder: &'a dyn Embedder,
    chunking: ChunkingConfig,
    workers: usize,
    progress: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn Embedder, chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { embedder, chunking, workers: DEFAULT_WORKERS, progress: false, cancel: None })
    }

    /// Upper bound on concurrent embedding calls.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Checked between documents; raising it stops the build with the
    /// records accumulated so far and `report.cancelled` set.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn build<I>(&self, corpus: I) -> Result<BuildOutput>
    where
        I: IntoIterator<Item = CorpusDocument>,
    {
        let documents: Vec<CorpusDocument> = corpus.into_iter().collect();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::Config(format!("failed to start embedding workers: {}", e)))?;
        let pb = self.progress_bar(documents.len());

        info!(
            documents = documents.len(),
            embedder = self.embedder.embedder_id(),
            max_chars = self.chunking.max_chars,
            overlap = self.chunking.overlap,
            "building index"
        );

        let mut report = BuildReport { dimension: self.embedder.dim(), ..BuildReport::default() };
        let mut records = Vec::with_capacity(documents.len());
        let mut seen_files = HashSet::new();

        for doc in documents {
            if self.is_cancelled() {
                info!(indexed = records.len(), "build cancelled");
                report.cancelled = true;
                break;
            }
            report.documents_seen += 1;
            pb.set_message(doc.id.clone());

            if !seen_files.insert(doc.id.clone()) {
                skip(&mut report, &doc.id, SkipReason::DuplicateFile);
                pb.inc(1);
                continue;
            }

            let chunks = chunk_with(&doc.text, &self.chunking)?;
            if chunks.is_empty() {
                skip(&mut report, &doc.id, SkipReason::NoText);
                pb.inc(1);
                continue;
            }
            let outcomes: Vec<ChunkOutcome> =
                pool.install(|| chunks.par_iter().map(|c| self.embed_chunk(c)).collect());

            if let Some(vector) = aggregate_document(&doc.id, outcomes, &mut report) {
                info!(file = %doc.id, chunks = chunks.len(), "indexed document");
                records.push(DocumentRecord { file: doc.id, text: doc.text, vector });
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        report.documents_indexed = records.len();
        info!(
            indexed = report.documents_indexed,
            skipped = report.skipped.len(),
            failed_chunks = report.chunk_failures.len(),
            "index build finished"
        );
        Ok(BuildOutput { records, report })
    }

    fn embed_chunk(&self, text: &str) -> ChunkOutcome {
        let vector = self.embedder.embed(text)?;
        if vector.is_empty() {
            return Err(Error::ProviderRejected("provider returned an empty embedding".to_string()));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(Error::ProviderRejected("provider returned non-finite values".to_string()));
        }
        Ok(vector)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Build with the default window and worker count.
pub fn build_index<I>(corpus: I, embedder: &dyn Embedder) -> Result<BuildOutput>
where
    I: IntoIterator<Item = CorpusDocument>,
{
    IndexBuilder::new(embedder, ChunkingConfig::default())?.build(corpus)
}

/// Fold one document's chunk outcomes into its mean vector, recording
/// failures in `report`. Returns `None` when the document must be skipped.
fn aggregate_document(
    file: &str,
    outcomes: Vec<ChunkOutcome>,
    report: &mut BuildReport,
) -> Option<Vec<f32>> {
    let mut vectors = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    for (chunk_index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(vector) => {
                debug!(file, chunk_index, dim = vector.len(), "embedded chunk");
                vectors.push(vector);
            }
            Err(err) => {
                warn!(file, chunk_index, error = %err, "failed to embed chunk");
                failed += 1;
                report.chunk_failures.push(ChunkFailure {
                    file: file.to_string(),
                    chunk_index,
                    reason: err.to_string(),
                });
            }
        }
    }
    if vectors.is_empty() {
        skip(report, file, SkipReason::NoEmbeddings { failed_chunks: failed });
        return None;
    }

    let mean = match mean_vector(&vectors) {
        Ok(mean) => mean,
        Err(Error::EmbeddingDimension { expected, actual }) => {
            skip(report, file, SkipReason::Dimension { expected, actual });
            return None;
        }
        Err(err) => {
            warn!(file, error = %err, "failed to average chunk vectors");
            skip(report, file, SkipReason::NoEmbeddings { failed_chunks: failed });
            return None;
        }
    };

    match report.dimension {
        Some(expected) if expected != mean.len() => {
            skip(report, file, SkipReason::Dimension { expected, actual: mean.len() });
            None
        }
        Some(_) => {
            report.chunks_embedded += vectors.len();
            Some(mean)
        }
        None => {
            report.dimension = Some(mean.len());
            report.chunks_embedded += vectors.len();
            Some(mean)
        }
    }
}

fn skip(report: &mut BuildReport, file: &str, reason: SkipReason) {
    warn!(file, %reason, "skipping document");
    report.skipped.push(SkippedDocument { file: file.to_string(), reason });
}
