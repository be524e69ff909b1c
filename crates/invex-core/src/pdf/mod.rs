//! PDF text extraction.

mod extractor;
pub mod layout;

pub use extractor::PdfTextExtractor;
pub use layout::{PageAnnotator, PlaceholderAnnotator, annotate_pages};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text pulled out of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Number of pages in the source document.
    pub page_count: u32,
    /// All page texts in page order, each followed by a newline.
    pub text: String,
}

/// Trait for turning a PDF byte stream into raw text.
pub trait TextExtractor: Send + Sync {
    /// Extract the concatenated page text of a PDF.
    ///
    /// Fails only when the stream cannot be opened as a PDF. A page with no
    /// extractable text contributes an empty line.
    fn extract(&self, data: &[u8]) -> Result<ExtractedText>;
}

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let raw = "  Invoice Number:\tINV-1\n\n\nTotal   Amount: 10.00 \r\n";
        assert_eq!(clean_text(raw), "Invoice Number: INV-1 Total Amount: 10.00");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\t "), "");
    }
}
