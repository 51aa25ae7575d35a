//! HTTP client for the text-completion service.

use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

/// Errors from the completion service call.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Any non-success status other than 429. Never retried.
    #[error("Completion service returned status {status}")]
    Service { status: u16, body: String },

    /// The retry budget ran out on repeated 429 responses.
    #[error("Rate limited after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Bearer-authenticated client for an OpenAI-compatible chat-completions
/// endpoint.
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
    max_retries: u32,
}

impl CompletionClient {
    pub fn new(endpoint: String, model: String, api_key: SecretString, max_retries: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
            api_key,
            max_retries,
        }
    }

    /// Sends the prompt and returns the raw response body.
    ///
    /// Only HTTP 429 is retried, waiting `2^attempt` seconds before the next
    /// try; any other non-success status fails immediately.
    pub async fn complete(&self, prompt: &str) -> Result<String, ExtractError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        for attempt in 0..self.max_retries {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(self.api_key.expose_secret())
                .json(&request)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == 429 {
                let wait = Duration::from_secs(1 << attempt);
                warn!(
                    "Completion service rate limited, retrying in {}s",
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ExtractError::Service {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.text().await?;
            debug!("Completion call succeeded ({} bytes)", body.len());
            return Ok(body);
        }

        Err(ExtractError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }
}
