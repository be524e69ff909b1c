//! Batch orchestration over many uploaded documents.
//!
//! The regex path runs documents on a bounded pool and collects results in
//! completion order. The model path keeps upload order and, with the default
//! of one worker, handles a single document at a time.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::InvexConfig;
use crate::document::Document;
use crate::error::{BatchError, InvexError, Result};
use crate::invoice::{FieldParser, FieldRecord, InvoiceRecord};
use crate::llm::StructuredExtractor;
use crate::pdf::{
    ExtractedText, PageAnnotator, PdfTextExtractor, PlaceholderAnnotator, TextExtractor,
    annotate_pages, clean_text,
};

/// Receives progress notifications while a batch runs.
///
/// Every method has a no-op default so observers implement only what they
/// display.
pub trait BatchObserver: Send + Sync {
    /// Called once before any document is processed.
    fn on_batch_start(&self, _total: usize) {}

    /// Called when a document is handed to a worker.
    fn on_document_start(&self, _filename: &str) {}

    /// Called with the cleaned text sent to the model.
    fn on_text_extracted(&self, _filename: &str, _text: &str) {}

    /// Called when a document produced a result.
    fn on_document_complete(&self, _filename: &str) {}

    /// Called when a document failed.
    fn on_document_failed(&self, _filename: &str, _error: &InvexError) {}

    /// Called once after the last document.
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// A value tagged with the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub filename: String,
    pub value: T,
}

/// Regex-path output for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldExtraction {
    pub fields: FieldRecord,
    /// One line per page when layout annotation is enabled.
    pub layout_notes: Option<String>,
}

/// A document that produced no result.
#[derive(Debug)]
pub struct DocumentFailure {
    pub filename: String,
    pub error: InvexError,
}

/// Results and failures of one batch.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub results: Vec<Extracted<T>>,
    pub failures: Vec<DocumentFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    /// Number of documents the batch saw.
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// The results, or a partial-failure error if any document failed.
    pub fn into_result(self) -> std::result::Result<Vec<Extracted<T>>, BatchError> {
        if self.failures.is_empty() {
            Ok(self.results)
        } else {
            Err(BatchError::PartialFailure {
                failed: self.failures.len(),
                total: self.total(),
            })
        }
    }

    fn record(&mut self, filename: String, result: Result<T>, observer: &dyn BatchObserver) {
        match result {
            Ok(value) => {
                observer.on_document_complete(&filename);
                self.results.push(Extracted { filename, value });
            }
            Err(error) => {
                warn!("Failed to process {}: {}", filename, error);
                observer.on_document_failed(&filename, &error);
                self.failures.push(DocumentFailure { filename, error });
            }
        }
    }
}

/// Effective pool size: at least one, never more than there are documents.
pub fn pool_size(workers: usize, documents: usize) -> usize {
    workers.max(1).min(documents.max(1))
}

/// Runs either extraction strategy over a batch of documents.
pub struct Orchestrator {
    text_extractor: Arc<dyn TextExtractor>,
    parser: FieldParser,
    annotator: Option<Arc<dyn PageAnnotator>>,
    regex_workers: usize,
    model_workers: usize,
}

impl Orchestrator {
    /// Orchestrator over `text_extractor` with 4 regex workers and 1 model worker.
    ///
    /// No layout annotation runs until an annotator is attached.
    pub fn new(text_extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            text_extractor,
            parser: FieldParser::new(),
            annotator: None,
            regex_workers: 4,
            model_workers: 1,
        }
    }

    /// Build from configuration with the bundled PDF extractor.
    pub fn from_config(config: &InvexConfig) -> Self {
        let extractor = PdfTextExtractor::new().with_fallback(config.pdf.fallback_extractor);
        let mut orchestrator = Self::new(Arc::new(extractor))
            .with_regex_workers(config.batch.regex_workers)
            .with_model_workers(config.batch.model_workers);
        if config.pdf.annotate_pages {
            orchestrator = orchestrator.with_annotator(Arc::new(PlaceholderAnnotator));
        }
        orchestrator
    }

    /// Annotate each page before text extraction.
    pub fn with_annotator(mut self, annotator: Arc<dyn PageAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Bound on documents parsed at once by the regex path.
    pub fn with_regex_workers(mut self, workers: usize) -> Self {
        self.regex_workers = workers;
        self
    }

    /// Bound on concurrent model calls. With 1, calls run one after another.
    pub fn with_model_workers(mut self, workers: usize) -> Self {
        self.model_workers = workers;
        self
    }

    /// Extract labeled fields from every document.
    ///
    /// At most `regex_workers` documents are in flight at once. A failing
    /// document is reported and never stops the others. Results arrive in
    /// completion order.
    pub async fn run_regex(
        &self,
        documents: Vec<Document>,
        observer: &dyn BatchObserver,
    ) -> BatchOutcome<FieldExtraction> {
        let total = documents.len();
        let workers = pool_size(self.regex_workers, total);
        info!("Regex extraction over {} documents with {} workers", total, workers);
        observer.on_batch_start(total);

        let mut outcome = BatchOutcome::default();
        let mut pending = stream::iter(documents.into_iter().map(|doc| {
            observer.on_document_start(&doc.filename);
            let extractor = Arc::clone(&self.text_extractor);
            let annotator = self.annotator.clone();
            let parser = self.parser;
            let filename = doc.filename.clone();

            async move {
                let joined = tokio::task::spawn_blocking(move || {
                    extract_fields(extractor.as_ref(), annotator.as_deref(), parser, &doc)
                })
                .await;
                (filename, flatten_join(joined))
            }
        }))
        .buffer_unordered(workers);

        while let Some((filename, result)) = pending.next().await {
            outcome.record(filename, result, observer);
        }

        observer.on_batch_complete(outcome.results.len(), outcome.failures.len());
        outcome
    }

    /// Extract nested invoice records with the language model.
    ///
    /// Results keep upload order. Model calls are bounded by `model_workers`.
    pub async fn run_model(
        &self,
        documents: Vec<Document>,
        extractor: &StructuredExtractor,
        observer: &dyn BatchObserver,
    ) -> BatchOutcome<InvoiceRecord> {
        let total = documents.len();
        let workers = pool_size(self.model_workers, total);
        info!("Model extraction over {} documents with {} workers", total, workers);
        observer.on_batch_start(total);

        let mut outcome = BatchOutcome::default();
        let mut pending = stream::iter(documents.into_iter().map(|doc| {
            let text_extractor = Arc::clone(&self.text_extractor);
            async move {
                observer.on_document_start(&doc.filename);
                let filename = doc.filename.clone();
                let result = extract_record(text_extractor, doc, extractor, observer).await;
                (filename, result)
            }
        }))
        .buffered(workers);

        while let Some((filename, result)) = pending.next().await {
            outcome.record(filename, result, observer);
        }

        observer.on_batch_complete(outcome.results.len(), outcome.failures.len());
        outcome
    }
}

fn extract_fields(
    extractor: &dyn TextExtractor,
    annotator: Option<&dyn PageAnnotator>,
    parser: FieldParser,
    doc: &Document,
) -> Result<FieldExtraction> {
    let ExtractedText { page_count, text } = extractor.extract(&doc.bytes)?;
    debug!("{}: {} pages, {} chars", doc.filename, page_count, text.len());

    Ok(FieldExtraction {
        fields: parser.parse(&text),
        layout_notes: annotator.map(|a| annotate_pages(a, page_count)),
    })
}

async fn extract_record(
    text_extractor: Arc<dyn TextExtractor>,
    doc: Document,
    extractor: &StructuredExtractor,
    observer: &dyn BatchObserver,
) -> Result<InvoiceRecord> {
    let filename = doc.filename.clone();
    let joined = tokio::task::spawn_blocking(move || text_extractor.extract(&doc.bytes)).await;
    let extracted = flatten_join(joined.map(|r| r.map_err(InvexError::from)))?;

    let cleaned = clean_text(&extracted.text);
    observer.on_text_extracted(&filename, &cleaned);

    Ok(extractor.extract(&cleaned).await?)
}

fn flatten_join<T>(
    joined: std::result::Result<Result<T>, tokio::task::JoinError>,
) -> Result<T> {
    joined.unwrap_or_else(|e| Err(InvexError::Worker(e.to_string())))
}
