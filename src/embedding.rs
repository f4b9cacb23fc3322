//! Vectorizer construction and the OpenAI-compatible HTTP provider.
//!
//! Two providers are available, selected by `embedding.provider`:
//!
//! | Config value | Vectorizer |
//! |--------------|------------|
//! | `"hashing"` | [`HashingVectorizer`] (default; offline, deterministic) |
//! | `"openai"` | [`OpenAiVectorizer`] |
//!
//! The OpenAI provider retries with exponential backoff on transient
//! errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (other) → fail immediately
//! - Network errors → retry

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;

use route_registry_core::embedding::{l2_normalize, HashingVectorizer, Vectorizer};
use route_registry_core::RegistryError;

use crate::config::EmbeddingConfig;

/// Vectorizer backed by an OpenAI-compatible `/v1/embeddings` endpoint.
///
/// Requires `OPENAI_API_KEY` in the environment. Responses whose
/// dimensionality differs from the configured `dims` are rejected.
pub struct OpenAiVectorizer {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OpenAiVectorizer {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for OpenAI provider"))?;

        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) => key,
            Err(_) => bail!("OPENAI_API_KEY environment variable not set"),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model,
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }

    fn request(&self, text: &str) -> std::result::Result<Vec<f32>, String> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // 1s, 2s, 4s, ... capped at 32s
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, model = %self.model, "retrying embedding request");
                std::thread::sleep(delay);
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send();

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().map_err(|e| e.to_string())?;
                        let mut vectors = parse_openai_response(&json)?;
                        return vectors
                            .pop()
                            .ok_or_else(|| "response contained no embeddings".to_string());
                    }

                    let body_text = response.text().unwrap_or_default();
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(format!("API error {status}: {body_text}"));
                        continue;
                    }
                    return Err(format!("API error {status}: {body_text}"));
                }
                Err(e) => {
                    last_err = Some(e.to_string());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| "embedding failed after retries".to_string()))
    }
}

impl Vectorizer for OpenAiVectorizer {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> route_registry_core::Result<Vec<f32>> {
        let mut vector = self
            .request(text)
            .map_err(|reason| RegistryError::embedding(&self.model, reason))?;
        if vector.len() != self.dims {
            return Err(RegistryError::embedding(
                &self.model,
                format!("expected {} dims, got {}", self.dims, vector.len()),
            ));
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }
}

/// Extract the `data[].embedding` arrays, ordered by `index`.
fn parse_openai_response(json: &serde_json::Value) -> std::result::Result<Vec<Vec<f32>>, String> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| "invalid response: missing data array".to_string())?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| "invalid response: missing embedding".to_string())?;
        let index = item
            .get("index")
            .and_then(|i| i.as_u64())
            .map(|i| i as usize)
            .unwrap_or(position);
        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

/// Build the vectorizer selected by `config.provider`.
pub fn create_vectorizer(config: &EmbeddingConfig) -> Result<Arc<dyn Vectorizer>> {
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingVectorizer::new(config.dims, config.ngrams)?)),
        "openai" => Ok(Arc::new(OpenAiVectorizer::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}
