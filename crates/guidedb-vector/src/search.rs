use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use guidedb_core::{snippet, DocumentRecord, Embedder, Error, Result, SearchHit};

use crate::math::{cosine_similarity, norm};
use crate::store;

/// A record paired with its similarity to the query. Borrows the record
/// from the loaded index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredRecord<'a> {
    pub score: f32,
    pub record: &'a DocumentRecord,
}

/// Rank `records` against an already-embedded query.
///
/// Ties keep index order. A stored record with zero norm scores `0.0`
/// rather than failing the whole query.
pub fn rank<'a>(query_vector: &[f32], records: &'a [DocumentRecord], top_k: usize) -> Result<Vec<ScoredRecord<'a>>> {
    if top_k == 0 {
        return Err(Error::InvalidArgument("top_k must be greater than zero".to_string()));
    }
    if records.is_empty() {
        return Ok(vec![]);
    }
    if query_vector.iter().any(|x| !x.is_finite()) {
        return Err(Error::ProviderRejected("query embedding contains non-finite values".to_string()));
    }
    if norm(query_vector) == 0.0 {
        return Err(Error::ZeroVector);
    }

    let mut scored = Vec::with_capacity(records.len());
    for record in records {
        let score = match cosine_similarity(query_vector, &record.vector) {
            Ok(score) => score,
            Err(Error::ZeroVector) => {
                warn!(file = %record.file, "stored vector has zero norm, scoring 0");
                0.0
            }
            Err(err) => return Err(err),
        };
        scored.push(ScoredRecord { score, record });
    }
    // sort_by is stable, so equal scores stay in index order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    Ok(scored)
}

/// Embed `query` and rank `records` against it.
pub fn search<'a>(
    query: &str,
    records: &'a [DocumentRecord],
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<Vec<ScoredRecord<'a>>> {
    if top_k == 0 {
        return Err(Error::InvalidArgument("top_k must be greater than zero".to_string()));
    }
    if records.is_empty() {
        debug!("search over empty index");
        return Ok(vec![]);
    }
    let query_vector = embedder.embed(query)?;
    let ranked = rank(&query_vector, records, top_k)?;
    info!(
        results = ranked.len(),
        top_score = ranked.first().map(|r| r.score).unwrap_or_default(),
        "search completed"
    );
    Ok(ranked)
}

/// Load the snapshot at `index_path`, search it and cut snippets for the
/// callers that compose prompts.
pub fn search_documents(
    query: &str,
    index_path: &Path,
    embedder: &dyn Embedder,
    top_k: usize,
    snippet_length: usize,
) -> Result<Vec<SearchHit>> {
    let records = store::load(index_path)?;
    let ranked = search(query, &records, embedder, top_k)?;
    Ok(ranked
        .into_iter()
        .map(|hit| SearchHit {
            file: hit.record.file.clone(),
            score: hit.score,
            snippet: snippet(&hit.record.text, snippet_length),
        })
        .collect())
}
