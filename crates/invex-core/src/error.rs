//! Error types for the invex-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Model-assisted extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Language-model client error.
    #[error("model client error: {0}")]
    Llm(#[from] LlmError),

    /// Report writing error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Batch-level error.
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading a PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF stream.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be opened with an empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by a completion client.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the endpoint.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP 429.
    #[error("rate limited by provider")]
    RateLimited,

    /// No API key in the configured environment variable.
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// Completion carried no message content.
    #[error("completion contained no content")]
    EmptyResponse,
}

impl LlmError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LlmError::Status { status, .. } => *status >= 500,
            LlmError::RateLimited | LlmError::EmptyResponse => true,
            LlmError::MissingApiKey(_) => false,
        }
    }
}

/// Errors related to model-assisted invoice extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The model never produced parseable JSON within the retry budget.
    #[error("unparseable model output after {attempts} attempts: {detail}")]
    UnparseableOutput { attempts: u32, detail: String },

    /// The model client failed and retrying cannot help (or the budget ran out).
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),
}

/// Errors related to writing the CSV report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The destination could not be created or written.
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Batch-level errors.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Some documents failed while others succeeded.
    #[error("{failed}/{total} documents failed")]
    PartialFailure { failed: usize, total: usize },
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
