//! Core library for invoice data extraction.
//!
//! This crate provides:
//! - PDF text extraction (lopdf, with a pdf-extract fallback)
//! - Labeled-field extraction with regular expressions
//! - Structured extraction through an OpenAI-compatible chat model
//! - Batch orchestration with bounded concurrency
//! - Flattening into a single CSV report layout

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod invoice;
pub mod llm;
pub mod pdf;
pub mod report;

#[cfg(test)]
mod test_support;

pub use batch::{
    BatchObserver, BatchOutcome, DocumentFailure, Extracted, FieldExtraction, NoopObserver,
    Orchestrator,
};
pub use config::InvexConfig;
pub use document::Document;
pub use error::{InvexError, Result};
pub use invoice::{Field, FieldParser, FieldRecord, InvoiceRecord, SENTINEL};
pub use llm::{CompletionClient, OpenAiClient, RetryPolicy, StructuredExtractor};
pub use pdf::{ExtractedText, PdfTextExtractor, TextExtractor, clean_text};
pub use report::{Column, FlatRow, Report, ReportWriter};
