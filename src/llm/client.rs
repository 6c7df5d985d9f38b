//! Async client for the external issue generator
//!
//! The generator is either a dedicated service that accepts the request JSON
//! directly, or a chat-completion API (Anthropic or OpenAI-compatible) that
//! receives the request JSON as the user message. Whatever the backend, the
//! engine sees one fallible call returning raw text.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{NationError, Result};
use crate::llm::context::{GeneratorRequest, RequestMode};

/// Anything that can answer a generator request with raw text
pub trait TextGenerator: Send + Sync {
    fn complete(&self, request: &GeneratorRequest) -> impl Future<Output = Result<String>> + Send;
}

/// API format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    /// POST the request JSON as-is
    Service,
    Anthropic,
    OpenAI,
}

pub struct GeneratorClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl GeneratorClient {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("/chat/completions") {
            ApiFormat::OpenAI
        } else {
            ApiFormat::Service
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: NATION_LLM_URL
    /// Optional: NATION_LLM_KEY (required by chat-completion backends)
    /// Optional: NATION_LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("NATION_LLM_URL")
            .map_err(|_| NationError::ConfigError("NATION_LLM_URL not set".into()))?;
        let api_key = std::env::var("NATION_LLM_KEY").ok();
        let model =
            std::env::var("NATION_LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        let client = Self::new(api_url, api_key, model);
        if client.api_format != ApiFormat::Service && client.api_key.is_none() {
            return Err(NationError::ConfigError(
                "NATION_LLM_KEY is required for chat-completion backends".into(),
            ));
        }
        Ok(client)
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    async fn complete_service(&self, body: String) -> Result<String> {
        let mut request = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .body(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NationError::LlmError(format!("{}: {}", status, error_text)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(NationError::LlmError("Empty response".into()));
        }
        Ok(text)
    }

    async fn complete_anthropic(&self, system: &str, user: String) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 2048,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NationError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| NationError::LlmError("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: String) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 2048,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user,
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.as_deref().unwrap_or_default()),
            )
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NationError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| NationError::LlmError(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| NationError::LlmError("Empty response".into()))
    }
}

impl TextGenerator for GeneratorClient {
    async fn complete(&self, request: &GeneratorRequest) -> Result<String> {
        let body = request.to_json()?;
        let system = match request.mode() {
            RequestMode::Interpret => INTERPRET_SYSTEM_PROMPT,
            RequestMode::Generate | RequestMode::ExpandOptions => ISSUE_SYSTEM_PROMPT,
        };
        tracing::debug!("Sending {:?} request to {:?} backend", request.mode(), self.api_format);
        match self.api_format {
            ApiFormat::Service => self.complete_service(body).await,
            ApiFormat::Anthropic => self.complete_anthropic(system, body).await,
            ApiFormat::OpenAI => self.complete_openai(system, body).await,
        }
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

const ISSUE_SYSTEM_PROMPT: &str = r#"You write policy dilemmas for a nation simulation game.
The user message is a JSON description of the nation. Write ONE new issue suited to its era,
government and recent history. Never reuse a title listed in "forbidden".
If "mode" is "expand-options", keep the issue in "currentIssue" and only write new options.

Use only words that fit the era. Early eras know nothing of machines, networks or atoms.

OUTPUT FORMAT (JSON only, no explanation):
{
  "title": "short title",
  "description": "two or three sentences",
  "category": "economy|security|health|culture|governance|innovation|infrastructure|food",
  "options": [
    {"text": "what the government does", "supporter": "who backs it", "effects": {"economy": 3, "happiness": -2}}
  ]
}

Write "desiredOptionCount" options. Effects are small integers between -10 and 10 keyed by
economy, civilRights, politicalFreedom, environment, happiness, crime, education, healthcare,
technology, population or gdp.
"#;

const INTERPRET_SYSTEM_PROMPT: &str = r#"You turn a ruler's free-text answer to a crisis into a policy option.
The user message is JSON with the nation, the crisis context and the ruler's response.

OUTPUT FORMAT (JSON only, no explanation):
{
  "text": "the response restated as a policy",
  "effects": {"happiness": 2, "economy": -1},
  "consequence": {"text": "possible later effect", "chance": 0.3, "type": "benefit|downside", "statEffects": {"crime": 2}}
}

"consequence" is optional. Effects are small integers between -8 and 8.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeneratorClient::new(
            "https://issues.example.com/generate".into(),
            Some("test-key".into()),
            "test-model".into(),
        );
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
        assert_eq!(client.model, "test-model");
        assert_eq!(client.api_format(), ApiFormat::Service);
    }

    #[test]
    fn test_detect_api_format() {
        assert_eq!(
            GeneratorClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            GeneratorClient::detect_api_format("https://api.deepseek.com/v1/chat/completions"),
            ApiFormat::OpenAI
        );
        assert_eq!(
            GeneratorClient::detect_api_format("http://localhost:8080/issues"),
            ApiFormat::Service
        );
    }

    #[test]
    fn test_from_env_missing_url() {
        let result = GeneratorClient::from_env();
        if std::env::var("NATION_LLM_URL").is_err() {
            assert!(result.is_err());
        }
    }
}
