//! LLM provider abstraction layer.
//!
//! Defines the [`LlmProvider`] trait and the shared request/response types
//! used by the oracle adapter.
//!
//! Two providers are implemented:
//! - [`openai::OpenAiProvider`]: OpenAI `/v1/chat/completions` API
//! - [`ollama::OllamaProvider`]: Ollama `/api/chat` API
//!
//! The [`router::ModelRouter`] resolves the correct provider for each call
//! based on the oracle role (`extraction` or `report`), falling back to the
//! configured default.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod ollama;
pub mod openai;
pub mod router;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message.
    System,
    /// Caller message.
    User,
    /// Assistant (intake) message.
    Assistant,
}

impl Role {
    /// Lowercase wire name used by chat-style APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single conversation turn sent to an LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl Message {
    /// Build a caller turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Build an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A request to an LLM provider for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation history including the latest caller message.
    pub messages: Vec<Message>,
    /// System prompt (injected before messages).
    pub system: Option<String>,
    /// Maximum tokens in the response.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Ask the provider for strictly machine-parseable JSON output.
    pub json_output: bool,
}

/// Usage statistics for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageStats {
    /// Tokens used in the prompt/input.
    pub input_tokens: u32,
    /// Tokens generated in the response.
    pub output_tokens: u32,
}

/// The response from an LLM provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Response text.
    pub text: String,
    /// Token usage.
    pub usage: UsageStats,
    /// The model identifier that served this response.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by model providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, mask API keys and truncate an upstream error body.
#[doc(hidden)]
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"sk-proj-[A-Za-z0-9_\-]{10,}", r"sk-[A-Za-z0-9]{32,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Core LLM provider interface.
///
/// Implementations must be `Send + Sync` so a single provider can serve
/// many sessions concurrently.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request a completion from the LLM.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// The model identifier string this provider is instantiated for.
    fn model_id(&self) -> &str;
}
