//! Chat-completion boundary for report generation.

use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Anything that turns a rendered prompt into generated text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Together AI client (OpenAI-compatible chat completions)
#[derive(Clone)]
pub struct TogetherClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl TogetherClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GenerationError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionClient for TogetherClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message { role: "user", content: prompt }],
            max_tokens,
            temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "LLM request failed");
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "LLM API error");
            return Err(GenerationError::Api(format!("{status}: {error_text}")));
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        let content = first_content(raw)?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "LLM completion"
        );
        Ok(content)
    }
}

fn first_content(raw: ChatResponseRaw) -> Result<String, GenerationError> {
    raw.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_as_chat_completion() {
        let request = ChatRequest {
            model: "m",
            messages: vec![Message { role: "user", content: "hi" }],
            max_tokens: 1024,
            temperature: 0.25,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["temperature"], 0.25);
    }

    #[test]
    fn blank_or_missing_content_is_unusable() {
        let blank: ChatResponseRaw =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert!(matches!(first_content(blank), Err(GenerationError::EmptyResponse)));

        let none: ChatResponseRaw = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(none), Err(GenerationError::EmptyResponse)));

        let ok: ChatResponseRaw =
            serde_json::from_str(r#"{"choices":[{"message":{"content":" report "}}]}"#).unwrap();
        assert_eq!(first_content(ok).unwrap(), "report");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let client = TogetherClient::new("key", "http://127.0.0.1:9/v1", "m").unwrap();
        let err = client.complete("hi", 5, 0.0).await.unwrap_err();
        assert!(matches!(err, GenerationError::Network(_)));
    }
}
