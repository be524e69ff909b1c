//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Language-model configuration.
    pub model: ModelConfig,

    /// Batch concurrency configuration.
    pub batch: BatchConfig,

    /// CSV report configuration.
    pub report: ReportConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Fall back to pdf-extract when no page yields text.
    pub fallback_extractor: bool,

    /// Attach per-page layout annotations to regex results.
    pub annotate_pages: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            fallback_extractor: true,
            annotate_pages: false,
        }
    }
}

/// Language-model client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Ask the endpoint for a JSON object response. Ignored for models that
    /// reject it (see [`ModelConfig::use_json_mode`]).
    pub json_mode: bool,

    /// Sampling temperature (provider default when unset).
    pub temperature: Option<f32>,

    /// Request timeout in seconds (HTTP client default when unset).
    pub timeout_secs: Option<u64>,

    /// Attempts per document, including the first.
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            json_mode: true,
            temperature: None,
            timeout_secs: None,
            max_attempts: 3,
            retry_delay_ms: 2000,
        }
    }
}

/// Chat models that answer `response_format: json_object` with a 400.
const JSON_MODE_UNSUPPORTED: &[&str] = &[
    "gpt-4",
    "gpt-4-0314",
    "gpt-4-0613",
    "gpt-4-32k",
    "gpt-4-32k-0314",
    "gpt-4-32k-0613",
    "gpt-3.5-turbo-0301",
    "gpt-3.5-turbo-0613",
    "gpt-3.5-turbo-16k",
];

impl ModelConfig {
    /// Pause between extraction attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Whether requests carry JSON mode: enabled and accepted by the model.
    pub fn use_json_mode(&self) -> bool {
        self.json_mode && !JSON_MODE_UNSUPPORTED.contains(&self.model.as_str())
    }
}

/// Concurrency bounds for both extraction paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Upper bound on concurrent regex-path documents.
    pub regex_workers: usize,

    /// Upper bound on concurrent model calls (1 = one document at a time).
    pub model_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            regex_workers: 4,
            model_workers: 1,
        }
    }
}

/// CSV report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory reports are written to.
    pub output_dir: PathBuf,

    /// File name prefix; a timestamp is appended.
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "extracted_data".to_string(),
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = InvexConfig::default();
        assert_eq!(config.batch.regex_workers, 4);
        assert_eq!(config.batch.model_workers, 1);
        assert_eq!(config.model.max_attempts, 3);
        assert_eq!(config.model.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.report.file_prefix, "extracted_data");
    }

    #[test]
    fn test_default_model_accepts_json_mode() {
        let model = ModelConfig::default();
        assert_eq!(model.model, "gpt-4o");
        assert!(model.json_mode);
        assert!(model.use_json_mode());
    }

    #[test]
    fn test_json_mode_dropped_for_older_models() {
        let model = ModelConfig {
            model: "gpt-4".to_string(),
            ..ModelConfig::default()
        };
        assert!(!model.use_json_mode());

        let model = ModelConfig {
            json_mode: false,
            ..ModelConfig::default()
        };
        assert!(!model.use_json_mode());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{"model": {"model": "gpt-4o-mini"}, "batch": {"regex_workers": 2}}"#)
                .unwrap();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.batch.regex_workers, 2);
        assert_eq!(config.batch.model_workers, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvexConfig::default();
        config.model.temperature = Some(0.0);
        config.save(&path).unwrap();

        let loaded = InvexConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model.temperature, Some(0.0));
    }
}
