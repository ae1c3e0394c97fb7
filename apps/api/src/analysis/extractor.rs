//! PDF text extraction.
//!
//! Pages are read one at a time so a single broken page only costs its own
//! text: it is replaced by a placeholder and extraction carries on. Failures
//! to open the document as a whole are returned as one error.

use std::panic;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

/// Separator placed between consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid PDF structure. The file may be corrupted or not a valid PDF.")]
    InvalidStructure(String),

    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("An unknown error occurred while loading the PDF document.")]
    Worker(String),
}

/// Turns document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError>;
}

/// Default extractor: per-page `lopdf` pass with a whole-document
/// `pdf-extract` fallback when the per-page pass finds no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, ExtractError> {
        // Parsing is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || extract_pdf_text(&document))
            .await
            .map_err(|e| ExtractError::Worker(e.to_string()))?
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageText {
    Text(String),
    Failed(u32),
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| classify_load_error(bytes, e))?;

    let pages: Vec<PageText> = doc
        .get_pages()
        .into_keys()
        .map(|page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => PageText::Text(text.trim().to_string()),
            Err(e) => {
                warn!("Error processing page {page_number}: {e}");
                PageText::Failed(page_number)
            }
        })
        .collect();

    debug!("Extracted {} page(s) from PDF", pages.len());

    let all_blank = pages
        .iter()
        .all(|p| matches!(p, PageText::Text(t) if t.is_empty()));
    if all_blank {
        return Ok(fallback_extract(bytes));
    }

    Ok(join_pages(&pages))
}

/// Joins page texts with a blank line between pages; failed pages become an
/// inline placeholder. The result is trimmed.
pub fn join_pages(pages: &[PageText]) -> String {
    let mut full = String::new();
    let last = pages.len().saturating_sub(1);
    for (i, page) in pages.iter().enumerate() {
        match page {
            PageText::Text(text) => {
                full.push_str(text);
                if pages.len() > 1 && i < last {
                    full.push_str(PAGE_SEPARATOR);
                }
            }
            PageText::Failed(number) => {
                full.push_str(&format!("[Error extracting text from page {number}]"));
                full.push_str(PAGE_SEPARATOR);
            }
        }
    }
    full.trim().to_string()
}

fn fallback_extract(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => text.trim().to_string(),
        Ok(Err(e)) => {
            warn!("Fallback PDF extraction failed: {e}");
            String::new()
        }
        Err(_) => {
            warn!("Fallback PDF extraction panicked");
            String::new()
        }
    }
}

fn classify_load_error(bytes: &[u8], err: lopdf::Error) -> ExtractError {
    let detail = err.to_string();
    warn!("Error loading PDF document: {detail}");

    let has_header = bytes[..bytes.len().min(1024)]
        .windows(5)
        .any(|w| w == b"%PDF-");
    let lower = detail.to_lowercase();
    let structural = ["header", "xref", "trailer", "parse", "invalid"]
        .iter()
        .any(|k| lower.contains(k));

    if !has_header || structural {
        ExtractError::InvalidStructure(detail)
    } else {
        ExtractError::Load(detail)
    }
}
