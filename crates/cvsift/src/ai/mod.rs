//! Structured field extraction via a remote text-completion service.
//!
//! The service contract is double-encoded: the HTTP body is JSON, and the
//! message content inside it is itself a JSON-encoded string of the record
//! shape. Both decode stages fall back to a degraded outcome instead of
//! failing, so one unparsable reply never kills a batch.

pub mod client;
pub mod prompts;

use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ExtractorConfig;

pub use client::{CompletionClient, ExtractError};

/// Structured fields extracted from one resume.
///
/// Keys the service omits default to empty values; the record stays usable
/// as long as the reply is a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
}

/// Outcome of field extraction for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    /// The reply parsed into the expected record shape.
    Fields(ResumeFields),
    /// The reply could not be parsed; the record carries the failure and the
    /// original body so the batch can continue.
    Degraded { error: String, raw_response: String },
}

impl ExtractionOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, ExtractionOutcome::Degraded { .. })
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Extracts resume fields by prompting the completion service.
pub struct FieldExtractor {
    client: CompletionClient,
    cooldown: Duration,
}

impl FieldExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            cooldown: Duration::from_secs(config.cooldown_secs),
            client: CompletionClient::new(
                config.endpoint,
                config.model,
                config.api_key,
                config.max_retries,
            ),
        }
    }

    /// Extracts structured fields from one resume's text.
    ///
    /// The cooldown delay is awaited unconditionally before the call
    /// sequence, once per document, to stay under the service rate limit.
    /// Transport and HTTP failures surface as [`ExtractError`]; reply parse
    /// failures come back as a degraded outcome.
    pub async fn extract_fields(&self, resume_text: &str) -> Result<ExtractionOutcome, ExtractError> {
        tokio::time::sleep(self.cooldown).await;

        let prompt = prompts::extraction_prompt(resume_text);
        let body = self.client.complete(&prompt).await?;
        Ok(parse_reply(&body))
    }
}

/// Double decode: outer body as JSON, then the message content as JSON again.
fn parse_reply(body: &str) -> ExtractionOutcome {
    let content = match serde_json::from_str::<CompletionResponse>(body) {
        Ok(response) => match response.choices.into_iter().next() {
            Some(choice) => choice.message.content,
            None => {
                return degraded("Completion response has no choices", body);
            }
        },
        Err(e) => {
            return degraded(&format!("Invalid completion response: {}", e), body);
        }
    };

    match serde_json::from_str::<ResumeFields>(&content) {
        Ok(fields) => ExtractionOutcome::Fields(fields),
        Err(e) => {
            warn!("Could not parse extracted fields: {}", e);
            degraded(&format!("Invalid field JSON: {}", e), body)
        }
    }
}

fn degraded(error: &str, body: &str) -> ExtractionOutcome {
    ExtractionOutcome::Degraded {
        error: error.to_string(),
        raw_response: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply_with_content(content: &str) -> String {
        json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
        .to_string()
    }

    #[test]
    fn test_parse_valid_double_encoded_reply() {
        let inner = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "+1 555 0100",
            "skills": ["Rust", "SQL"],
            "experience": ["Backend engineer at Acme"]
        })
        .to_string();
        let body = reply_with_content(&inner);

        match parse_reply(&body) {
            ExtractionOutcome::Fields(fields) => {
                assert_eq!(fields.name, "Jane Doe");
                assert_eq!(fields.skills, vec!["Rust", "SQL"]);
                assert_eq!(fields.experience.len(), 1);
            }
            other => panic!("Expected Fields, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_inner_content_degrades() {
        let body = reply_with_content("Sure! Here is the JSON you asked for: {name: Jane}");

        match parse_reply(&body) {
            ExtractionOutcome::Degraded {
                error,
                raw_response,
            } => {
                assert!(error.contains("Invalid field JSON"));
                // The degraded record carries the original body, not the inner content
                assert_eq!(raw_response, body);
            }
            other => panic!("Expected Degraded, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_outer_body_degrades() {
        let body = "<html>gateway error</html>";

        match parse_reply(body) {
            ExtractionOutcome::Degraded { raw_response, .. } => {
                assert_eq!(raw_response, body);
            }
            other => panic!("Expected Degraded, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choices_degrades() {
        let body = json!({"choices": []}).to_string();
        assert!(parse_reply(&body).is_degraded());
    }

    #[test]
    fn test_missing_keys_default() {
        let inner = json!({"name": "Jane Doe"}).to_string();
        let body = reply_with_content(&inner);

        match parse_reply(&body) {
            ExtractionOutcome::Fields(fields) => {
                assert_eq!(fields.name, "Jane Doe");
                assert!(fields.email.is_empty());
                assert!(fields.skills.is_empty());
            }
            other => panic!("Expected Fields, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_inner_degrades() {
        let body = reply_with_content("[1, 2, 3]");
        assert!(parse_reply(&body).is_degraded());
    }

    #[test]
    fn test_degraded_serializes_error_and_raw_response() {
        let outcome = ExtractionOutcome::Degraded {
            error: "boom".to_string(),
            raw_response: "raw".to_string(),
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["error"], "boom");
        assert_eq!(value["raw_response"], "raw");
    }
}
