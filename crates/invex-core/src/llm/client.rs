//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CompletionClient;
use crate::config::ModelConfig;
use crate::error::LlmError;

/// Client for `POST {base_url}/chat/completions`.
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    json_mode: bool,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Build a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: &ModelConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if config.json_mode && !config.use_json_mode() {
            debug!("JSON mode is not supported by {}, sending plain requests", config.model);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            json_mode: config.use_json_mode(),
            temperature: config.temperature,
        })
    }

    /// Build a client reading the API key from `config.api_key_env`.
    pub fn from_config(config: &ModelConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(api_key, config)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request<'a>(&'a self, system: &'a str, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            response_format: self.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request(system, user);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        debug!("Completion from {} with {} choices", self.model, parsed.choices.len());

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;

    #[test]
    fn test_request_body_json_mode() {
        let config = ModelConfig::default();
        let client = OpenAiClient::new("sk-test", &config).unwrap();
        let body = serde_json::to_value(client.request("sys", "user text")).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "user text"}
                ],
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_request_body_plain() {
        let config = ModelConfig {
            json_mode: false,
            temperature: Some(0.0),
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ModelConfig::default()
        };
        let client = OpenAiClient::new("sk-test", &config).unwrap();
        let body = serde_json::to_value(client.request("s", "u")).unwrap();

        assert!(body.get("response_format").is_none());
        assert_eq!(body["temperature"], json!(0.0));
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_request_body_omits_json_mode_for_gpt_4() {
        let config = ModelConfig {
            model: "gpt-4".to_string(),
            ..ModelConfig::default()
        };
        let client = OpenAiClient::new("sk-test", &config).unwrap();
        let body = serde_json::to_value(client.request("s", "u")).unwrap();

        assert_eq!(body["model"], json!("gpt-4"));
        assert!(body.get("response_format").is_none());
    }

    async fn complete_against(status: &'static str, body: &'static str) -> Result<String, LlmError> {
        let config = ModelConfig {
            base_url: serve_once(status, body),
            timeout_secs: Some(10),
            ..ModelConfig::default()
        };
        let client = OpenAiClient::new("sk-test", &config).unwrap();
        client.complete("sys", "user").await
    }

    #[tokio::test]
    async fn test_success_returns_content() {
        let reply = complete_against(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"Invoice Number\": \"A-1\"}"}}]}"#,
        )
        .await
        .unwrap();
        assert_eq!(reply, r#"{"Invoice Number": "A-1"}"#);
    }

    #[tokio::test]
    async fn test_too_many_requests_is_rate_limited() {
        let err = complete_against("429 Too Many Requests", r#"{"error": {}}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_server_error_is_transient_status() {
        let err = complete_against("503 Service Unavailable", r#"{"error": "overloaded"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Status { status: 503, ref body } if body.contains("overloaded")));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_client_error_is_permanent_status() {
        let err = complete_against(
            "400 Bad Request",
            r#"{"error": {"message": "'response_format' of type 'json_object' is not supported with this model."}}"#,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::Status { status: 400, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_null_content_is_empty_response() {
        let err = complete_against(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_response() {
        let err = complete_against("200 OK", r#"{"choices": []}"#).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[test]
    fn test_missing_api_key() {
        let config = ModelConfig {
            api_key_env: "INVEX_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ModelConfig::default()
        };
        let err = OpenAiClient::from_config(&config).err().unwrap();
        assert!(matches!(err, LlmError::MissingApiKey(ref var) if var == "INVEX_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
