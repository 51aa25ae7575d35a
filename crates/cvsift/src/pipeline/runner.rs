use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use tracing::info_span;
use walkdir::WalkDir;

use crate::ai::{ExtractError, ExtractionOutcome, FieldExtractor};
use crate::processor::ProcessorRegistry;
use crate::rank::{Embedder, Ranker};

use super::error::PipelineError;

/// One ranked resume in the pipeline output.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeRecord {
    pub file: String,
    pub info: ExtractionOutcome,
    pub relevance_score: f64,
}

/// Per-document working state carried between the extraction loop and the
/// ranking call, so file, fields, and text never drift out of alignment.
struct DocumentEntry {
    file: String,
    info: ExtractionOutcome,
    text: String,
}

/// Runs the extract and rank stages over a folder of stored resumes.
pub struct Pipeline<E> {
    processor: ProcessorRegistry,
    extractor: FieldExtractor,
    ranker: Ranker<E>,
}

impl<E: Embedder> Pipeline<E> {
    pub fn new(extractor: FieldExtractor, embedder: E) -> Self {
        Self {
            processor: ProcessorRegistry::new(),
            extractor,
            ranker: Ranker::new(embedder),
        }
    }

    /// Extracts fields from and scores every `.pdf` file in `folder`,
    /// returning records sorted by relevance score, descending.
    ///
    /// Per-document failures degrade that document's record; the batch always
    /// produces one record per scanned file. The ranker runs once over the
    /// full batch so the job description is embedded a single time.
    pub async fn run(
        &self,
        folder: &Path,
        job_description: &str,
    ) -> Result<Vec<ResumeRecord>, PipelineError> {
        let _span = info_span!("pipeline", folder = %folder.display()).entered();

        let files = list_pdf_files(folder)?;
        info!("Processing {} resume file(s)", files.len());

        let mut entries = Vec::with_capacity(files.len());
        for path in &files {
            entries.push(self.process_document(path).await);
        }

        let texts: Vec<String> = entries.iter().map(|entry| entry.text.clone()).collect();
        let scores = self.ranker.score(job_description, &texts).await?;

        let mut records: Vec<ResumeRecord> = entries
            .into_iter()
            .zip(scores)
            .map(|(entry, score)| ResumeRecord {
                file: entry.file,
                info: entry.info,
                relevance_score: score,
            })
            .collect();

        // Stable sort: ties keep directory iteration order, which is
        // filesystem-dependent.
        records.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(records)
    }

    /// Extracts text and fields for one file. Failures degrade the record;
    /// they never abort the batch. The retained text is exactly what the
    /// ranker will score.
    async fn process_document(&self, path: &Path) -> DocumentEntry {
        let file = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();

        info!("Processing {}", file);

        let text = match self.processor.process(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not extract text from {}: {}", file, e);
                return DocumentEntry {
                    file,
                    info: ExtractionOutcome::Degraded {
                        error: e.to_string(),
                        raw_response: String::new(),
                    },
                    text: String::new(),
                };
            }
        };

        let info = match self.extractor.extract_fields(&text).await {
            Ok(outcome) => outcome,
            Err(ExtractError::Service { status, body }) => {
                warn!(
                    "Completion service failed for {} with status {}",
                    file, status
                );
                ExtractionOutcome::Degraded {
                    error: format!("Completion service returned status {}", status),
                    raw_response: body,
                }
            }
            Err(e) => {
                warn!("Field extraction failed for {}: {}", file, e);
                ExtractionOutcome::Degraded {
                    error: e.to_string(),
                    raw_response: String::new(),
                }
            }
        };

        DocumentEntry { file, info, text }
    }
}

/// Lists regular files with a `.pdf` extension (case-insensitive) directly
/// inside `folder`. Other formats the collector may have saved are ignored
/// here.
fn list_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| PipelineError::ScanFailed {
            path: folder.to_path_buf(),
            source: e,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);

        if is_pdf {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
