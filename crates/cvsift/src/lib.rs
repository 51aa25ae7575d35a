pub mod ai;
pub mod config;
pub mod email;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod rank;
pub mod secrets;
pub mod storage;

pub use ai::{ExtractionOutcome, FieldExtractor, ResumeFields};
pub use config::{Config, EmbeddingsConfig, ExtractorConfig, MailboxConfig};
pub use error::{ConfigError, CvsiftError, ProcessError, Result, StorageError};
pub use pipeline::{Pipeline, PipelineError, ResumeRecord};
pub use rank::{cosine_similarity, Embedder, HttpEmbedder, RankError, Ranker};
pub use secrets::{resolve_secret, SecretError};
pub use storage::FileStorage;
