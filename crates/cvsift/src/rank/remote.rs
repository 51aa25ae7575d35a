//! Embeddings over an OpenAI-compatible HTTP endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingsConfig;

use super::{Embedder, RankError};

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedder backed by a remote embeddings endpoint. Determinism is the
/// model's contract: a fixed model maps identical text to identical vectors.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingsConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint,
            model: config.model,
            api_key: config.api_key,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
        let request = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RankError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let mut parsed: EmbeddingsResponse = response.json().await?;

        // The service reports a row index; order by it instead of trusting
        // response order.
        parsed.data.sort_by_key(|row| row.index);
        if parsed.data.len() != texts.len() {
            return Err(RankError::Malformed(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        debug!("Embedded {} text(s)", texts.len());
        Ok(parsed.data.into_iter().map(|row| row.embedding).collect())
    }
}
