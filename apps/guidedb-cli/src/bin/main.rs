use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use guidedb_core::config::{expand_path, Config, Settings};
use guidedb_core::CorpusReader;
use guidedb_embed::embedder_from_settings;
use guidedb_text::ParagraphIndex;
use guidedb_vector::{export_embeddings, load, save_snapshot, search_documents, IndexBuilder};

#[derive(Parser, Debug)]
#[command(name = "guidedb", version, about = "Build and query a guideline document index")]
struct Cli {
    /// Extra TOML file merged over config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the corpus, embed every document and write the index snapshot.
    Build {
        #[arg(long)]
        corpus: Option<PathBuf>,
        #[arg(long)]
        index: Option<PathBuf>,
        /// Only index the first N files (sorted by path).
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        progress: bool,
    },
    /// Rank indexed documents by similarity to QUERY.
    Search {
        query: String,
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long)]
        top_k: Option<usize>,
        #[arg(long)]
        snippet_length: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Paragraphs of the indexed documents containing TERM.
    Keyword {
        term: String,
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        max_results: usize,
    },
    /// Write `{file, embedding}` pairs as JSON.
    Export {
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load_with(cli.config.as_deref()).context("loading configuration")?;
    let settings = config.settings()?;

    match cli.command {
        Command::Build { corpus, index, limit, workers, progress } => {
            let corpus_dir = corpus.map(expand_pathbuf).unwrap_or_else(|| settings.corpus_dir());
            let index_path = index_path(index, &settings);
            build(&settings, &corpus_dir, &index_path, limit, workers, progress)
        }
        Command::Search { query, index, top_k, snippet_length, json } => {
            let index_path = index_path(index, &settings);
            let top_k = top_k.unwrap_or(settings.search.top_k);
            let snippet_length = snippet_length.unwrap_or(settings.search.snippet_length);
            let embedder = embedder_from_settings(&settings.embedding)?;
            let hits = search_documents(&query, &index_path, embedder.as_ref(), top_k, snippet_length)
                .with_context(|| format!("searching {}", index_path.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("No results found.");
            } else {
                for (rank, hit) in hits.iter().enumerate() {
                    println!("{}. {} (score: {:.4})", rank + 1, hit.file, hit.score);
                    println!("   {}", hit.snippet);
                }
            }
            Ok(())
        }
        Command::Keyword { term, index, max_results } => {
            let index_path = index_path(index, &settings);
            let records = load(&index_path).with_context(|| format!("loading {}", index_path.display()))?;
            let hits = ParagraphIndex::from_records(&records)?.search(&term, max_results)?;
            if hits.is_empty() {
                println!("No results found.");
            }
            for hit in hits {
                println!("[{}] (score: {:.3})\n{}\n", hit.source, hit.score, hit.paragraph);
            }
            Ok(())
        }
        Command::Export { index, output } => {
            let index_path = index_path(index, &settings);
            let records = load(&index_path).with_context(|| format!("loading {}", index_path.display()))?;
            export_embeddings(&records, &output)?;
            println!("Exported {} embeddings to {}", records.len(), output.display());
            Ok(())
        }
    }
}

fn build(
    settings: &Settings,
    corpus_dir: &Path,
    index_path: &Path,
    limit: Option<usize>,
    workers: Option<usize>,
    progress: bool,
) -> Result<()> {
    let reader = CorpusReader::new(settings.corpus.extension.clone());
    let docs = match limit {
        Some(limit) => reader.read_dir_limited(corpus_dir, limit),
        None => reader.read_dir(corpus_dir),
    }
    .with_context(|| format!("reading corpus {}", corpus_dir.display()))?;

    let embedder = embedder_from_settings(&settings.embedding)?;
    let out = IndexBuilder::new(embedder.as_ref(), settings.chunking)?
        .workers(workers.unwrap_or(settings.embedding.workers))
        .progress(progress)
        .build(docs)?;

    let meta = save_snapshot(&out.records, index_path, embedder.embedder_id())
        .with_context(|| format!("writing index {}", index_path.display()))?;
    info!(path = %index_path.display(), "index written");

    println!(
        "Indexed {} of {} documents ({} skipped, {} failed chunks), dimension {}",
        meta.documents,
        out.report.documents_seen,
        out.report.skipped.len(),
        out.report.chunk_failures.len(),
        meta.dimension
    );
    Ok(())
}

fn index_path(flag: Option<PathBuf>, settings: &Settings) -> PathBuf {
    flag.map(expand_pathbuf).unwrap_or_else(|| settings.index_path())
}

fn expand_pathbuf(p: PathBuf) -> PathBuf {
    expand_path(p.to_string_lossy())
}
