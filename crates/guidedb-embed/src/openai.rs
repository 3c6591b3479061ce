use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use guidedb_core::{Embedder, Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for the OpenAI `/embeddings` endpoint (or any compatible server).
pub struct OpenAiEmbedder {
    client: HttpClient,
    model: String,
    api_key: String,
    base_url: String,
    id: String,
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct Response {
    data: Vec<ResponseItem>,
}

#[derive(Deserialize)]
struct ResponseItem {
    embedding: Vec<f64>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl OpenAiEmbedder {
    pub fn new(model: &str, api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            model: model.to_string(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            id: format!("openai:{}", model),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}

impl Embedder for OpenAiEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn dim(&self) -> Option<usize> { known_dimension(&self.model) }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let req = Request { model: &self.model, input: text };
        debug!(model = %self.model, chars = text.chars().count(), "requesting embedding");
        let response = self
            .client
            .post(url)
            .headers(self.headers()?)
            .json(&req)
            .send()
            .map_err(|e| Error::Provider(format!("embedding request failed: {}", e)))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Provider(format!("failed to read embedding response: {}", e)))?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &error_message(&body)));
        }
        parse_embedding_response(&body)
    }
}

/// Rate limits and server errors are worth retrying; any other failing
/// status (bad key, bad request, unknown model) is not.
pub fn status_error(status: u16, message: &str) -> Error {
    let detail = format!("openai embeddings failed ({}): {}", status, message);
    if status == 429 || (500..600).contains(&status) {
        Error::Provider(detail)
    } else {
        Error::ProviderRejected(detail)
    }
}

/// Extract the first embedding from an `/embeddings` response body.
pub fn parse_embedding_response(body: &str) -> Result<Vec<f32>> {
    let parsed: Response = serde_json::from_str(body)
        .map_err(|e| Error::ProviderRejected(format!("malformed embedding response: {}", e)))?;
    let first = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| Error::ProviderRejected("missing embedding data".to_string()))?;
    if first.embedding.is_empty() {
        return Err(Error::ProviderRejected("provider returned an empty embedding".to_string()));
    }
    Ok(first.embedding.into_iter().map(|v| v as f32).collect())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| "unknown error".to_string())
}

/// Output size of the well-known OpenAI embedding models.
pub fn known_dimension(model: &str) -> Option<usize> {
    match model {
        "text-embedding-3-large" => Some(3072),
        "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
        _ => None,
    }
}
