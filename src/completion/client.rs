/// Chat-completion HTTP client implementation.
///
/// This module provides `CompletionClient` for making synchronous requests to an
/// OpenAI-compatible chat-completion API, along with error types and a builder.
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Base URL used when neither the builder nor `OPENAI_BASE_URL` supplies one.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used when neither the builder nor `FMTAGS_MODEL` supplies one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.5;

/// Errors that can occur when talking to the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-related errors (connection failures, DNS resolution, timeouts)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Response was well-formed JSON but did not carry a completion
    #[error("Completion API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
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

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub n: u8,
    pub temperature: f32,
}

/// Builder for constructing `CompletionClient` instances.
///
/// # Examples
///
/// ```
/// use fmtags::completion::CompletionClientBuilder;
///
/// let client = CompletionClientBuilder::new()
///     .base_url("http://localhost:8080/v1")
///     .model("gpt-4o-mini")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "gpt-4o-mini");
/// ```
#[derive(Debug, Default)]
pub struct CompletionClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

impl CompletionClientBuilder {
    /// Creates a new `CompletionClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the API (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier sent with each request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `CompletionClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Each setting not given to the builder falls back to an environment variable,
    /// then to a default:
    ///
    /// - `OPENAI_BASE_URL`, default [`DEFAULT_BASE_URL`]
    /// - `OPENAI_API_KEY`, default empty (no `Authorization` header is sent)
    /// - `FMTAGS_MODEL`, default [`DEFAULT_MODEL`]
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::InvalidUrl` if the base URL does not parse, or
    /// `CompletionError::Network` if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<CompletionClient, CompletionError> {
        let base_url = self.base_url.unwrap_or_else(|| {
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
        });
        let api_key = self
            .api_key
            .unwrap_or_else(|| std::env::var("OPENAI_API_KEY").unwrap_or_default());
        let model = self.model.unwrap_or_else(|| {
            std::env::var("FMTAGS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
        });

        reqwest::Url::parse(&base_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(CompletionError::Network)?;

        Ok(CompletionClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }
}

/// Synchronous HTTP client for an OpenAI-compatible chat-completion API.
///
/// Each call is a single request; failures are returned to the caller as-is.
/// It should be constructed using `CompletionClientBuilder`.
pub struct CompletionClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Trait for chat-completion operations.
///
/// This trait enables mocking in unit tests and provides a clean interface
/// for requesting completions.
pub trait CompletionClientTrait: Send + Sync {
    /// Sends `messages` and returns the text of the first choice.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

impl CompletionClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn complete_internal(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            n: 1,
            temperature: TEMPERATURE,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        tracing::debug!(model = %self.model, "sending completion request");
        let response = request.send().map_err(CompletionError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
            });
        }

        let text = response.text().map_err(CompletionError::Network)?;
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(CompletionError::Serialization)?;

        extract_content(&json)
    }
}

impl CompletionClientTrait for CompletionClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.complete_internal(messages)
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion response.
fn extract_content(json: &serde_json::Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| CompletionError::Api {
            message: "Missing 'choices[0].message.content' in API response".to_string(),
        })
}
