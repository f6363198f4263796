//! LLM client for OpenRouter-compatible chat-completion providers
//!
//! The course pipeline consumes generation through the [`TextGeneration`]
//! trait so transport can be swapped out (and faked in tests). The default
//! implementation is [`OpenRouterClient`], which talks to any
//! OpenAI-compatible `/chat/completions` endpoint.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Text generation capability consumed by the course pipeline.
///
/// `instruction` is the fixed task description (system message), `payload`
/// the serialized data to operate on (user message). An `Err` from this
/// trait means the provider failed to produce any response at all; content
/// that fails downstream validation is the caller's concern.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    async fn generate(&self, instruction: &str, payload: &str) -> Result<String>;
}

// ============ Provider Configuration ============

/// Configuration for an LLM API provider
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL for the API (e.g., "https://openrouter.ai/api/v1")
    pub base_url: String,
    /// API key for authentication
    pub api_key: String,
    /// Extra headers to include in requests (e.g., X-Title, HTTP-Referer)
    pub extra_headers: Vec<(String, String)>,
}

impl ProviderConfig {
    /// Create an OpenRouter provider configuration
    pub fn openrouter(api_key: String) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            api_key,
            extra_headers: vec![
                (
                    "HTTP-Referer".to_string(),
                    "https://github.com/courseloom".to_string(),
                ),
                ("X-Title".to_string(), "Courseloom".to_string()),
            ],
        }
    }

    /// Create a provider configuration with a custom base URL
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            base_url,
            api_key,
            extra_headers: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// LLM API client for OpenRouter and other OpenAI-compatible providers
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Arc<Client>,
    provider: ProviderConfig,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl OpenRouterClient {
    /// Create a new client with the given provider configuration and model
    pub fn new(provider: ProviderConfig, model: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            provider,
            model: model.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Create a client from config (API key resolved from the environment)
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.openrouter.api_key()?;
        let provider = if config.openrouter.base_url == OPENROUTER_BASE_URL {
            ProviderConfig::openrouter(api_key)
        } else {
            ProviderConfig::with_base_url(api_key, config.openrouter.base_url.clone())
        };
        Ok(Self::new(provider, config.models.synthesis.clone())
            .with_max_tokens(config.analysis.max_tokens))
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a chat completion request and return the assistant content
    pub async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut req_builder = self
            .client
            .post(format!("{}/chat/completions", self.provider.base_url))
            .header("Authorization", format!("Bearer {}", self.provider.api_key));
        for (key, value) in &self.provider.extra_headers {
            req_builder = req_builder.header(key.as_str(), value.as_str());
        }
        let response = req_builder
            .json(&request)
            .send()
            .await
            .context("Failed to send request to LLM provider")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("LLM API error ({}): {}", status, body);
        }

        let body = response.text().await.context("Failed to read response body")?;

        // Parse as raw Value first for maximum provider compatibility.
        // Strict struct deserialization breaks on models that return
        // non-standard field types.
        let raw: serde_json::Value = serde_json::from_str(body.trim())
            .context("Failed to parse provider response as JSON")?;

        Ok(extract_content(&raw))
    }
}

/// Extract assistant content from a chat-completion response.
///
/// Handles both plain string content and the array-of-content-parts format
/// some models return.
fn extract_content(raw: &serde_json::Value) -> String {
    let content_value = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"));

    match content_value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(parts)) => parts
            .iter()
            .filter_map(|part| {
                if part.get("type").and_then(|t| t.as_str()) == Some("text") {
                    part.get("text").and_then(|t| t.as_str()).map(String::from)
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

#[async_trait]
impl TextGeneration for OpenRouterClient {
    async fn generate(&self, instruction: &str, payload: &str) -> Result<String> {
        tracing::debug!(
            "LLM request: instruction {} chars, payload {} chars",
            instruction.len(),
            payload.len()
        );
        self.complete(vec![
            ChatMessage::system(instruction),
            ChatMessage::user(payload),
        ])
        .await
    }
}
