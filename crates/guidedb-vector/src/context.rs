//! Turning search hits into prompt context for the report and chat callers.

use guidedb_core::SearchHit;

/// `Source:`/`Content:` blocks separated by a blank line.
pub fn render_report_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("Source: {}\nContent: {}", hit.file, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Like [`render_report_context`] but with the score shown next to the source.
pub fn render_chat_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("Source: {} (score: {:.3})\nSnippet: {}", hit.file, hit.score, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Keep hits whose snippet or file name contains `needle`, ignoring case.
pub fn filter_hits(hits: &[SearchHit], needle: &str) -> Vec<SearchHit> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return hits.to_vec();
    }
    hits.iter()
        .filter(|hit| hit.snippet.to_lowercase().contains(&needle) || hit.file.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
