//! PDF page text extraction.
//!
//! Text is extracted page by page with the pdf-extract crate; when that
//! fails, lopdf's per-page extraction is tried before giving up.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during PDF extraction
#[derive(Debug, Error)]
pub enum PdfExtractError {
    #[error("Failed to extract text from PDF: {0}")]
    ExtractionFailed(String),

    #[error("File not found or not a valid PDF: {0}")]
    InvalidFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplies a document's text, one string per page, in reading order.
pub trait PageTextSource {
    fn pages(&self) -> Result<Vec<String>, PdfExtractError>;
}

/// Already extracted pages
impl PageTextSource for Vec<String> {
    fn pages(&self) -> Result<Vec<String>, PdfExtractError> {
        Ok(self.clone())
    }
}

/// A PDF file on disk.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    path: PathBuf,
}

impl PdfDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageTextSource for PdfDocument {
    fn pages(&self) -> Result<Vec<String>, PdfExtractError> {
        let path = self.path.as_path();

        if !path.exists() {
            return Err(PdfExtractError::InvalidFile(format!(
                "File not found: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(PdfExtractError::InvalidFile(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        match pdf_extract::extract_text_by_pages(path) {
            Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => Ok(pages),
            Ok(_) => {
                tracing::debug!("pdf-extract returned no text for {}, trying lopdf", path.display());
                extract_with_lopdf(path)
            }
            Err(e) => {
                tracing::debug!("pdf-extract failed on {}: {}; trying lopdf", path.display(), e);
                extract_with_lopdf(path)
            }
        }
    }
}

fn extract_with_lopdf(path: &Path) -> Result<Vec<String>, PdfExtractError> {
    let document = lopdf::Document::load(path)
        .map_err(|e| PdfExtractError::ExtractionFailed(e.to_string()))?;

    let pages = document
        .get_pages()
        .keys()
        .map(|&number| {
            document.extract_text(&[number]).unwrap_or_else(|e| {
                tracing::warn!("No text extracted from page {}: {}", number, e);
                String::new()
            })
        })
        .collect();

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_nonexistent_file() {
        let result = PdfDocument::new("/nonexistent/file.pdf").pages();
        assert!(matches!(result, Err(PdfExtractError::InvalidFile(_))));
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfDocument::new(dir.path()).pages();
        assert!(matches!(result, Err(PdfExtractError::InvalidFile(_))));
    }

    #[test]
    fn test_garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();
        assert!(PdfDocument::new(&path).pages().is_err());
    }

    #[test]
    fn test_preextracted_pages() {
        let pages = vec!["one".to_string(), "two".to_string()];
        assert_eq!(pages.pages().unwrap(), pages);
    }
}
