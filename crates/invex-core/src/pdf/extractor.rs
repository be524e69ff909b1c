//! PDF text extraction using lopdf, with pdf-extract as a whole-document fallback.

use lopdf::Document;
use tracing::{debug, trace};

use super::{ExtractedText, Result, TextExtractor};
use crate::error::PdfError;

/// Page-by-page PDF text extractor.
#[derive(Debug, Clone)]
pub struct PdfTextExtractor {
    /// Re-run extraction with pdf-extract when lopdf finds no text at all.
    fallback: bool,
}

impl PdfTextExtractor {
    /// Create a new extractor with the fallback enabled.
    pub fn new() -> Self {
        Self { fallback: true }
    }

    /// Enable or disable the pdf-extract fallback.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Open the document, decrypting with the empty password when needed.
    ///
    /// Returns the parsed document and the (possibly decrypted) bytes.
    fn load(&self, data: &[u8]) -> Result<(Document, Vec<u8>)> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let bytes = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok((doc, bytes))
    }

    fn fallback_text(&self, bytes: &[u8]) -> Option<String> {
        match pdf_extract::extract_text_from_mem(bytes) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                debug!("pdf-extract fallback failed: {}", e);
                None
            }
        }
    }
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<ExtractedText> {
        let (doc, bytes) = self.load(data)?;
        let pages = doc.get_pages();
        let page_count = pages.len() as u32;

        let mut text = String::new();
        let mut total_text_len = 0;

        // get_pages is a BTreeMap keyed by page number, so this is page order.
        for &page_num in pages.keys() {
            let page_text = doc.extract_text(&[page_num]).unwrap_or_else(|e| {
                trace!("No text on page {}: {}", page_num, e);
                String::new()
            });
            let page_text = page_text.trim_end_matches('\n');
            total_text_len += page_text.trim().len();
            text.push_str(page_text);
            text.push('\n');
        }

        if total_text_len == 0 && self.fallback {
            if let Some(fallback) = self.fallback_text(&bytes) {
                debug!("lopdf found no text, using pdf-extract output");
                text = fallback;
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
        }

        debug!(
            "Extracted {} chars of text from {} pages",
            total_text_len, page_count
        );

        Ok(ExtractedText { page_count, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pdf_with_pages, pdf_without_pages};

    #[test]
    fn test_rejects_garbage() {
        let extractor = PdfTextExtractor::new();
        let err = extractor.extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_rejects_empty_document() {
        let extractor = PdfTextExtractor::new();
        let err = extractor.extract(&pdf_without_pages()).unwrap_err();
        assert!(matches!(err, PdfError::NoPages | PdfError::Parse(_)));
    }

    #[test]
    fn test_pages_in_order() {
        let data = pdf_with_pages(&["Invoice Number: A-1", "Total Amount: 10.00"]);
        let extracted = PdfTextExtractor::new().extract(&data).unwrap();

        assert_eq!(extracted.page_count, 2);
        let first = extracted.text.find("A-1").expect("page 1 text");
        let second = extracted.text.find("10.00").expect("page 2 text");
        assert!(first < second);
        assert!(extracted.text.ends_with('\n'));
    }

    #[test]
    fn test_blank_page_is_not_a_failure() {
        let data = pdf_with_pages(&["Invoice Number: B-2", ""]);
        let extracted = PdfTextExtractor::new()
            .with_fallback(false)
            .extract(&data)
            .unwrap();

        assert_eq!(extracted.page_count, 2);
        assert!(extracted.text.contains("B-2"));
    }
}
