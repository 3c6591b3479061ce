//! Vector side of the retrieval engine: building per-document mean
//! embeddings, persisting them as a snapshot and ranking them by cosine
//! similarity at query time.

pub mod builder;
pub mod context;
pub mod export;
pub mod math;
pub mod search;
pub mod store;

pub use builder::{build_index, BuildOutput, BuildReport, ChunkFailure, IndexBuilder, SkipReason, SkippedDocument};
pub use context::{filter_hits, render_chat_context, render_report_context};
pub use export::export_embeddings;
pub use math::{cosine_similarity, mean_vector};
pub use search::{rank, search, search_documents, ScoredRecord};
pub use store::{load, load_snapshot, save, save_snapshot, IndexSnapshot, SnapshotMeta};
