//! Model-assisted extraction of nested invoice records.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, trace, warn};

use super::CompletionClient;
use super::prompts::{SYSTEM_PROMPT, build_extraction_prompt};
use crate::config::ModelConfig;
use crate::error::{ExtractionError, LlmError};
use crate::invoice::InvoiceRecord;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; at least one is always made.
    pub max_attempts: u32,
    /// Pause before every attempt after the first.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay(),
        }
    }
}

/// Why the most recent attempt failed.
enum AttemptFailure {
    Unparseable(String),
    Transient(LlmError),
}

/// Turns cleaned invoice text into an [`InvoiceRecord`] via a language model.
///
/// The reply is trimmed and parsed as a JSON object with no further schema
/// checks. Unparseable replies and transient client errors are retried under
/// the [`RetryPolicy`]; anything else fails immediately.
pub struct StructuredExtractor {
    client: Arc<dyn CompletionClient>,
    retry: RetryPolicy,
}

impl StructuredExtractor {
    /// Extractor over `client` with the default retry policy.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Extract one invoice from cleaned text.
    pub async fn extract(&self, text: &str) -> Result<InvoiceRecord, ExtractionError> {
        let prompt = build_extraction_prompt(text);
        let attempts = self.retry.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 1..=attempts {
            if attempt > 1 {
                sleep(self.retry.delay).await;
            }

            match self.client.complete(SYSTEM_PROMPT, &prompt).await {
                Ok(reply) => {
                    let content = reply.trim();
                    trace!("Raw model output (attempt {}): {}", attempt, content);

                    match parse_record(content) {
                        Ok(record) => {
                            debug!("Parsed model output on attempt {}", attempt);
                            return Ok(record);
                        }
                        Err(detail) => {
                            warn!("Attempt {} failed: {}", attempt, detail);
                            last_failure = Some(AttemptFailure::Unparseable(detail));
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    last_failure = Some(AttemptFailure::Transient(e));
                }
                Err(e) => return Err(ExtractionError::Model(e)),
            }
        }

        Err(match last_failure {
            Some(AttemptFailure::Transient(e)) => ExtractionError::Model(e),
            Some(AttemptFailure::Unparseable(detail)) => ExtractionError::UnparseableOutput {
                attempts,
                detail,
            },
            None => ExtractionError::UnparseableOutput {
                attempts,
                detail: "no attempt made".to_string(),
            },
        })
    }
}

/// Parse trimmed model output as a JSON object.
fn parse_record(content: &str) -> Result<InvoiceRecord, String> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("JSON decoding failed: {}", e))?;
    InvoiceRecord::from_value(value).ok_or_else(|| "expected a JSON object".to_string())
}
