//! PDF text extraction.

use askpdf_core::error::IngestError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// The text of one PDF page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page number
    pub number: u32,
    pub text: String,
}

/// Extract the text of every page of the PDF at `path`.
///
/// Pages with no text are dropped. Extraction runs on the blocking pool.
pub async fn load_pdf(path: &Path) -> Result<Vec<Page>, IngestError> {
    if !path.is_file() {
        return Err(IngestError::NotFound(path.to_path_buf()));
    }

    let owned: PathBuf = path.to_path_buf();
    let texts = tokio::task::spawn_blocking(move || pdf_extract::extract_text_by_pages(&owned))
        .await
        .map_err(|e| IngestError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .map_err(|e| IngestError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let total = texts.len();
    let pages = number_pages(texts);
    debug!(path = %path.display(), total, kept = pages.len(), "Extracted PDF text");

    if pages.is_empty() {
        return Err(IngestError::EmptyDocument(path.to_path_buf()));
    }
    Ok(pages)
}

/// Number extracted page texts from zero, dropping blank pages.
pub fn number_pages(texts: Vec<String>) -> Vec<Page> {
    texts
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| Page {
            number: i as u32,
            text,
        })
        .collect()
}
