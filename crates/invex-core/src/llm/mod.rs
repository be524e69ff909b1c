//! Language-model access for the model extraction strategy.

mod client;
mod extractor;
pub mod prompts;

pub use client::OpenAiClient;
pub use extractor::{RetryPolicy, StructuredExtractor};

use async_trait::async_trait;

use crate::error::LlmError;

/// A chat-completion endpoint.
///
/// Clients are built once per process and shared by handle; the pipeline
/// never calls one from more than `batch.model_workers` tasks at a time.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a system role and a user prompt, returning the reply text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}
