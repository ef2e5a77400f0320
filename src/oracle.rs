//! Adapter to the external language-understanding oracle.
//!
//! Sends a system prompt plus the conversation to the routed LLM provider in
//! JSON mode and parses the structured reply. [`Oracle::extract`] never
//! fails: transport errors and malformed output both degrade to
//! [`ExtractionResult::fallback`], with no retry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::providers::router::{ModelRouter, RouterError};
use crate::providers::{CompletionRequest, Message, ProviderError};

/// Reply shown when the oracle output cannot be used.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I had trouble processing that. Could you repeat what you said?";

/// Reply used when the oracle omits the `response` field.
pub const DEFAULT_REPLY: &str = "Could you tell me a bit more about what happened?";

/// Router role for extraction turns.
pub const EXTRACTION_ROLE: &str = "extraction";

/// Router role for report generation.
pub const REPORT_ROLE: &str = "report";

/// Errors from a single oracle round trip.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// No provider is routed for the role.
    #[error("oracle unavailable: {0}")]
    Routing(#[from] RouterError),
    /// The provider call failed.
    #[error("oracle call failed: {0}")]
    Provider(#[from] ProviderError),
    /// The reply was not the expected JSON object.
    #[error("malformed oracle output: {0}")]
    Malformed(String),
}

/// Structured output of a classification or fact-gathering turn.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractionResult {
    /// Facts extracted from the latest message; values may be null.
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_facts: BTreeMap<String, Value>,
    /// Proposed case type identifier.
    #[serde(default)]
    pub case_type: Option<String>,
    /// Confidence in the proposed case type; quoted numbers are accepted.
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub case_type_confidence: f64,
    /// Conversational reply for the caller.
    #[serde(default = "default_reply", deserialize_with = "reply_or_default")]
    pub response: String,
    /// Whether the oracle thinks enough is known to write the report.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ready_for_report: bool,
}

impl ExtractionResult {
    /// The fixed result used when the oracle output is unusable.
    pub fn fallback() -> Self {
        Self {
            extracted_facts: BTreeMap::new(),
            case_type: None,
            case_type_confidence: 0.0,
            response: FALLBACK_REPLY.to_owned(),
            ready_for_report: false,
        }
    }
}

fn default_reply() -> String {
    DEFAULT_REPLY.to_owned()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Confidence {
        Number(f64),
        Text(String),
    }

    match Option::<Confidence>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Confidence::Number(n)) => Ok(n),
        Some(Confidence::Text(raw)) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom("case_type_confidence is not a number")),
    }
}

fn reply_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default_reply))
}

/// Parse oracle text into a JSON-backed type.
///
/// Tolerates prose around the object by taking the outermost `{...}` span.
///
/// # Errors
///
/// Returns [`OracleError::Malformed`] when no JSON object can be decoded.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, OracleError> {
    let trimmed = text.trim();
    let json_text = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    serde_json::from_str(json_text).map_err(|e| {
        let preview: String = text.chars().take(200).collect();
        debug!(output = %preview, "undecodable oracle output");
        OracleError::Malformed(e.to_string())
    })
}

/// Handle to the routed oracle providers.
#[derive(Debug, Clone)]
pub struct Oracle {
    router: Arc<ModelRouter>,
    config: OracleConfig,
}

impl Oracle {
    /// Create an oracle over a model router.
    pub fn new(router: Arc<ModelRouter>, config: OracleConfig) -> Self {
        Self { router, config }
    }

    /// Run one extraction turn, absorbing every failure.
    pub async fn extract(&self, system: &str, history: &[Message]) -> ExtractionResult {
        match self.try_extract(system, history).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "oracle extraction failed, using fallback");
                ExtractionResult::fallback()
            }
        }
    }

    /// Run one extraction turn.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] on routing, transport or parse failure.
    pub async fn try_extract(
        &self,
        system: &str,
        history: &[Message],
    ) -> Result<ExtractionResult, OracleError> {
        self.request_json(
            EXTRACTION_ROLE,
            system,
            history.to_vec(),
            self.config.extraction_max_tokens,
        )
        .await
    }

    /// Send a JSON-mode request for `role` and decode the reply.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] on routing, transport or parse failure.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        role: &str,
        system: &str,
        messages: Vec<Message>,
        max_tokens: u32,
    ) -> Result<T, OracleError> {
        let provider = self.router.resolve(Some(role))?;

        let request = CompletionRequest {
            messages,
            system: Some(system.to_owned()),
            max_tokens: Some(max_tokens),
            temperature: Some(self.config.temperature),
            json_output: true,
        };

        let response = provider.complete(request).await?;
        debug!(
            role,
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "oracle responded"
        );

        parse_json_object(&response.text)
    }

    /// Token cap for report generation.
    pub fn report_max_tokens(&self) -> u32 {
        self.config.report_max_tokens
    }
}
