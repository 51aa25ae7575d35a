//! Relevance ranking by embedding cosine similarity.

pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

pub use remote::HttpEmbedder;

/// Errors from the embedding backend.
#[derive(Debug, Error)]
pub enum RankError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding service returned status {status}")]
    Service { status: u16, body: String },

    #[error("Embedding response malformed: {0}")]
    Malformed(String),
}

/// Embedding backend seam.
///
/// Implementations must be deterministic under a fixed model: identical text
/// always yields the identical vector, and every vector in one call has the
/// same dimensionality.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError>;
}

/// Scores resume texts against a job description.
pub struct Ranker<E> {
    embedder: E,
}

impl<E: Embedder> Ranker<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    /// Returns one score per input text, in input order, each in [-1, 1] and
    /// rounded to 4 decimal digits. The job description is embedded once per
    /// call; scores are only comparable within that call.
    pub async fn score(
        &self,
        job_description: &str,
        resume_texts: &[String],
    ) -> Result<Vec<f64>, RankError> {
        if resume_texts.is_empty() {
            return Ok(Vec::new());
        }

        let job_input = [job_description.to_string()];
        let job_vector = self
            .embedder
            .embed(&job_input)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RankError::Malformed("no vector returned for the job description".to_string())
            })?;

        let resume_vectors = self.embedder.embed(resume_texts).await?;
        if resume_vectors.len() != resume_texts.len() {
            return Err(RankError::Malformed(format!(
                "expected {} vectors, got {}",
                resume_texts.len(),
                resume_vectors.len()
            )));
        }

        Ok(resume_vectors
            .iter()
            .map(|vector| round4(cosine_similarity(&job_vector, vector)))
            .collect())
    }
}

/// Cosine similarity in [-1, 1]. Inputs must share a dimensionality;
/// zero-magnitude inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|y| (*y as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic embedder: counts occurrences of a fixed vocabulary.
    struct KeywordEmbedder;

    const VOCABULARY: [&str; 4] = ["rust", "python", "databases", "cooking"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RankError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let lowered = text.to_lowercase();
                    VOCABULARY
                        .iter()
                        .map(|word| lowered.matches(word).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_identity() {
        let v = [1.0_f32, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite() {
        let sim = cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]);
        assert!((sim + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123_456_7), 0.1235);
        assert_eq!(round4(-0.999_99), -1.0);
    }

    #[tokio::test]
    async fn test_scores_in_range_and_in_order() {
        let ranker = Ranker::new(KeywordEmbedder);
        let texts = vec![
            "rust rust databases".to_string(),
            "cooking cooking cooking".to_string(),
        ];

        let scores = ranker.score("rust databases", &texts).await.unwrap();
        assert_eq!(scores.len(), 2);
        for score in &scores {
            assert!((-1.0..=1.0).contains(score), "score out of range: {}", score);
        }
        // The matching text outranks the unrelated one
        assert!(scores[0] > scores[1]);
    }

    #[tokio::test]
    async fn test_score_is_deterministic() {
        let ranker = Ranker::new(KeywordEmbedder);
        let texts = vec![
            "rust and python and databases".to_string(),
            "python only".to_string(),
        ];

        let first = ranker.score("rust python", &texts).await.unwrap();
        let second = ranker.score("rust python", &texts).await.unwrap();
        // Bit-identical floats under the same embedder
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let ranker = Ranker::new(KeywordEmbedder);
        let scores = ranker.score("anything", &[]).await.unwrap();
        assert!(scores.is_empty());
    }
}
