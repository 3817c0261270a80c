/// Chat-completion HTTP client module.
///
/// This module provides a blocking HTTP client for OpenAI-compatible
/// `/chat/completions` endpoints, along with its error type and builder.
mod client;

pub use client::{
    ChatMessage, ChatRequest, CompletionClient, CompletionClientBuilder, CompletionClientTrait,
    CompletionError, DEFAULT_BASE_URL, DEFAULT_MODEL, TEMPERATURE,
};
