//! Embedding clients behind [`guidedb_core::Embedder`].
//!
//! `APP_USE_FAKE_EMBEDDINGS=1` switches every caller to the [`HashEmbedder`]
//! for fast, deterministic, network-free runs.

use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::info;

use guidedb_core::config::{EmbeddingSettings, ProviderKind};
use guidedb_core::Embedder;

pub mod hash;
pub mod openai;
pub mod retry;

pub use hash::HashEmbedder;
pub use openai::{parse_embedding_response, status_error, OpenAiEmbedder};
pub use retry::{RetryPolicy, Retrying};

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the embedder described by `settings`.
pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() {
        info!(dim = settings.hash_dim, "using hash embedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(HashEmbedder::new(settings.hash_dim)));
    }
    match settings.provider {
        ProviderKind::Hash => {
            info!(dim = settings.hash_dim, "using hash embedder");
            Ok(Box::new(HashEmbedder::new(settings.hash_dim)))
        }
        ProviderKind::OpenAi => {
            let api_key = std::env::var(&settings.api_key_env)
                .map_err(|_| anyhow!("environment variable {} is not set", settings.api_key_env))?;
            let client = OpenAiEmbedder::new(
                &settings.model,
                &api_key,
                &settings.base_url,
                Duration::from_secs(settings.timeout_secs),
            )?;
            info!(model = %settings.model, base_url = %settings.base_url, "using openai embedder");
            let policy = RetryPolicy::new(settings.retries, Duration::from_millis(settings.retry_base_ms));
            Ok(Box::new(Retrying::new(client, policy)))
        }
    }
}

pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    embedder_from_settings(&EmbeddingSettings::default())
}
