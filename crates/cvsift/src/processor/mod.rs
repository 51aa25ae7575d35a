//! Document-to-text conversion for stored resume files.

pub mod docx;
pub mod pdf;
pub mod text;

use std::path::Path;

use crate::error::ProcessError;

/// Resume document formats the registry can convert to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

pub trait DocumentProcessor: Send + Sync {
    fn process(&self, path: &Path) -> Result<String, ProcessError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

pub struct ProcessorRegistry {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self {
            processors: vec![
                Box::new(text::TextProcessor::new()),
                Box::new(pdf::PdfProcessor::new()),
                Box::new(docx::DocxProcessor::new()),
            ],
        }
    }

    /// Converts the document at `path` to plain text, trimmed of leading and
    /// trailing whitespace.
    pub fn process(&self, path: &Path) -> Result<String, ProcessError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let format = DocumentFormat::from_extension(extension)
            .ok_or_else(|| ProcessError::UnsupportedFormat(extension.to_string()))?;

        for processor in &self.processors {
            if processor.supports(format) {
                let text = processor.process(path)?;
                return Ok(text.trim().to_string());
            }
        }

        Err(ProcessError::UnsupportedFormat(extension.to_string()))
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_registry_routes_text_format() {
        let registry = ProcessorRegistry::new();

        let mut temp_file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(temp_file, "  Ten years of Rust experience  ").unwrap();

        let text = registry.process(temp_file.path()).unwrap();
        assert_eq!(text, "Ten years of Rust experience");
    }

    #[test]
    fn test_unsupported_format_error() {
        let registry = ProcessorRegistry::new();

        let temp_file = NamedTempFile::with_suffix(".xyz").unwrap();
        std::fs::write(temp_file.path(), b"some content").unwrap();

        let result = registry.process(temp_file.path());
        match result {
            Err(ProcessError::UnsupportedFormat(ext)) => assert_eq!(ext, "xyz"),
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_no_extension_error() {
        let registry = ProcessorRegistry::new();

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("noextension");
        std::fs::write(&file_path, b"some content").unwrap();

        let result = registry.process(&file_path);
        match result {
            Err(ProcessError::UnsupportedFormat(ext)) => assert_eq!(ext, ""),
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[test]
    fn test_file_not_found_error() {
        let registry = ProcessorRegistry::new();

        let result = registry.process(Path::new("/nonexistent/path/file.txt"));
        assert!(matches!(result, Err(ProcessError::ReadDocument { .. })));
    }

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(
            DocumentFormat::from_extension("PDF"),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_extension("Docx"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_extension("TXT"),
            Some(DocumentFormat::Text)
        );
        assert_eq!(DocumentFormat::from_extension("rtf"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }
}
