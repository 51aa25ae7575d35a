//! Runtime configuration, assembled and validated once at startup.
//!
//! Every knob is read from the process environment; credentials resolve
//! through [`crate::secrets::resolve_secret`]. Nothing here performs I/O
//! beyond environment and secret-file reads, so a missing credential is
//! reported before any connection attempt.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::secrets::resolve_secret;

pub const EMAIL_ENV: &str = "CVSIFT_EMAIL";
pub const EMAIL_PASSWORD_ENV: &str = "CVSIFT_EMAIL_PASSWORD";
pub const LLM_API_KEY_ENV: &str = "CVSIFT_LLM_API_KEY";
pub const EMBEDDINGS_API_KEY_ENV: &str = "CVSIFT_EMBEDDINGS_API_KEY";

const DEFAULT_IMAP_HOST: &str = "imap.gmail.com";
const DEFAULT_IMAP_PORT: u16 = 993;
const DEFAULT_IMAP_FOLDER: &str = "INBOX";
const DEFAULT_RESUMES_DIR: &str = "resumes";
const DEFAULT_COMPLETIONS_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_COMPLETIONS_MODEL: &str = "llama3-70b-8192";
const DEFAULT_EMBEDDINGS_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";
const DEFAULT_EMBEDDINGS_MODEL: &str = "text-embedding-3-small";

/// Mailbox connection settings for the attachment collector.
#[derive(Debug)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
    pub folder: String,
    /// Login address.
    pub address: String,
    /// Login secret (app password).
    pub secret: SecretString,
}

/// Completion-service settings for the field extractor.
#[derive(Debug)]
pub struct ExtractorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: SecretString,
    /// Delay awaited before every document's call sequence, to stay under
    /// the service rate limit.
    pub cooldown_secs: u64,
    /// Total attempt budget for rate-limited calls.
    pub max_retries: u32,
}

/// Embedding-service settings for the relevance ranker.
#[derive(Debug)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<SecretString>,
}

#[derive(Debug)]
pub struct Config {
    pub mailbox: MailboxConfig,
    pub extractor: ExtractorConfig,
    pub embeddings: EmbeddingsConfig,
    /// Flat folder where collected resumes land and the ranker scans.
    pub resumes_dir: PathBuf,
}

impl Config {
    /// Builds the configuration from the environment, validating everything
    /// up front. Missing credentials abort here, before any I/O.
    pub fn from_env() -> Result<Self, ConfigError> {
        let address = env_string(EMAIL_ENV)
            .ok_or(ConfigError::MissingCredentials(EMAIL_ENV))?;
        let secret = resolve_secret(None, None, Some(EMAIL_PASSWORD_ENV))
            .map_err(|_| ConfigError::MissingCredentials(EMAIL_PASSWORD_ENV))?;
        let api_key = resolve_secret(None, None, Some(LLM_API_KEY_ENV))
            .map_err(|_| ConfigError::MissingCredentials(LLM_API_KEY_ENV))?;
        let embeddings_api_key = resolve_secret(None, None, Some(EMBEDDINGS_API_KEY_ENV)).ok();

        let port = match env_string("CVSIFT_IMAP_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                field: "CVSIFT_IMAP_PORT",
                reason: format!("'{}' is not a valid port number", raw),
            })?,
            None => DEFAULT_IMAP_PORT,
        };

        let cooldown_secs = match env_string("CVSIFT_LLM_COOLDOWN_SECS") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                field: "CVSIFT_LLM_COOLDOWN_SECS",
                reason: format!("'{}' is not a valid number of seconds", raw),
            })?,
            None => 10,
        };

        Ok(Self {
            mailbox: MailboxConfig {
                host: env_string("CVSIFT_IMAP_HOST")
                    .unwrap_or_else(|| DEFAULT_IMAP_HOST.to_string()),
                port,
                folder: env_string("CVSIFT_IMAP_FOLDER")
                    .unwrap_or_else(|| DEFAULT_IMAP_FOLDER.to_string()),
                address,
                secret,
            },
            extractor: ExtractorConfig {
                endpoint: env_string("CVSIFT_LLM_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_COMPLETIONS_ENDPOINT.to_string()),
                model: env_string("CVSIFT_LLM_MODEL")
                    .unwrap_or_else(|| DEFAULT_COMPLETIONS_MODEL.to_string()),
                api_key,
                cooldown_secs,
                max_retries: 3,
            },
            embeddings: EmbeddingsConfig {
                endpoint: env_string("CVSIFT_EMBEDDINGS_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_EMBEDDINGS_ENDPOINT.to_string()),
                model: env_string("CVSIFT_EMBEDDINGS_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDINGS_MODEL.to_string()),
                api_key: embeddings_api_key,
            },
            resumes_dir: env_string("CVSIFT_RESUMES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESUMES_DIR)),
        })
    }
}

/// Reads an environment variable, treating empty values as unset.
fn env_string(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}
