//! OpenAI provider implementation using the `/v1/chat/completions` API.

use serde::{Deserialize, Serialize};

use super::{
    check_http_response, CompletionRequest, CompletionResponse, LlmProvider, ProviderError,
    UsageStats,
};

/// Default OpenAI chat completions endpoint.
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MAX_TOKENS: u32 = 1024;

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenAI chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<OpenAiMessage>,
    /// Maximum completion tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Structured output mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A message in OpenAI chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`system`, `user`, `assistant`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// `response_format` request field.
#[doc(hidden)]
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ResponseFormat {
    /// Format type (`json_object`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// OpenAI chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    pub choices: Vec<OpenAiChoice>,
    /// Model that served the response.
    pub model: String,
    /// Token usage.
    pub usage: Option<OpenAiUsage>,
}

/// A response choice from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
}

/// Assistant message from OpenAI.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

/// OpenAI usage statistics.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiUsage {
    /// Prompt token count.
    pub prompt_tokens: Option<u32>,
    /// Completion token count.
    pub completion_tokens: Option<u32>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenAI chat completions API provider.
#[derive(Clone)]
pub struct OpenAiProvider {
    model_spec: String,
    model_name: String,
    api_key: String,
    /// Endpoint URL, overridable for tests and compatible gateways.
    #[doc(hidden)]
    pub endpoint: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("model_spec", &self.model_spec)
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a new OpenAI provider instance.
    pub fn new(model_spec: String, model_name: String, api_key: String) -> Self {
        Self {
            model_spec,
            model_name,
            api_key,
            endpoint: OPENAI_API_BASE.to_owned(),
            client: reqwest::Client::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an OpenAI API request from a completion request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> OpenAiRequest {
    let mut messages: Vec<OpenAiMessage> =
        Vec::with_capacity(request.messages.len().saturating_add(1));

    if let Some(system) = &request.system {
        messages.push(OpenAiMessage {
            role: "system".to_owned(),
            content: system.clone(),
        });
    }

    messages.extend(request.messages.iter().map(|msg| OpenAiMessage {
        role: msg.role.as_str().to_owned(),
        content: msg.content.clone(),
    }));

    OpenAiRequest {
        model: model.to_owned(),
        messages,
        max_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: request.temperature,
        response_format: request.json_output.then(|| ResponseFormat {
            kind: "json_object".to_owned(),
        }),
    }
}

/// Parse an OpenAI API response into a completion response.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the response cannot be deserialized or
/// has no choices.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<CompletionResponse, ProviderError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    let usage = UsageStats {
        input_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.prompt_tokens)
            .unwrap_or(0),
        output_tokens: resp
            .usage
            .as_ref()
            .and_then(|u| u.completion_tokens)
            .unwrap_or(0),
    };

    Ok(CompletionResponse {
        text: choice.message.content.unwrap_or_default(),
        usage,
        model: resp.model,
    })
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let api_request = build_request(&self.model_name, &request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model_spec
    }
}
