//! Model router resolving providers by oracle role and default settings.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use crate::config::{ModelsConfig, OracleConfig};
use crate::credentials::Credentials;

use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::LlmProvider;

/// Provider routing errors.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Model spec is not in `<provider>/<model>` format.
    #[error("invalid model spec '{spec}', expected '<provider>/<model>'")]
    InvalidModelSpec {
        /// Invalid raw spec.
        spec: String,
    },
    /// The requested provider spec is not available.
    #[error("provider not available for model spec '{spec}'")]
    UnavailableProvider {
        /// Unavailable spec.
        spec: String,
    },
    /// Unsupported provider type in spec prefix.
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider {
        /// Unsupported provider prefix.
        provider: String,
    },
    /// Required API credential missing for selected provider.
    #[error("missing credential for provider '{provider}': {key}")]
    MissingCredential {
        /// Provider name.
        provider: String,
        /// Missing credential key.
        key: String,
    },
}

/// Model router resolving `role -> default`.
#[derive(Clone)]
pub struct ModelRouter {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default: String,
    role_overrides: HashMap<String, String>,
}

impl std::fmt::Debug for ModelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRouter")
            .field("default", &self.default)
            .field("role_overrides", &self.role_overrides)
            .field("providers", &self.available_specs())
            .finish()
    }
}

impl ModelRouter {
    /// Build a router from model config and loaded credentials.
    ///
    /// Role overrides whose provider cannot be built are skipped with a
    /// warning and fall back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the default provider cannot be instantiated.
    pub fn from_config(
        models: &ModelsConfig,
        oracle: &OracleConfig,
        credentials: &Credentials,
    ) -> anyhow::Result<Self> {
        let mut providers: HashMap<String, Arc<dyn LlmProvider>> = HashMap::new();

        let default = instantiate_provider(&models.default, oracle, credentials)
            .with_context(|| format!("default provider '{}' is unavailable", models.default))?;
        providers.insert(models.default.clone(), default);

        for (role, spec) in &models.roles {
            if providers.contains_key(spec) {
                continue;
            }
            match instantiate_provider(spec, oracle, credentials) {
                Ok(provider) => {
                    providers.insert(spec.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(role = %role, spec = %spec, error = %e, "role override unavailable, using default");
                }
            }
        }

        Ok(Self {
            providers,
            default: models.default.clone(),
            role_overrides: models.roles.clone(),
        })
    }

    /// Create a router backed by a single provider for integration tests.
    #[doc(hidden)]
    pub fn for_testing(default_spec: String, provider: Arc<dyn LlmProvider>) -> Self {
        let mut providers = HashMap::new();
        providers.insert(default_spec.clone(), provider);
        Self {
            providers,
            default: default_spec,
            role_overrides: HashMap::new(),
        }
    }

    /// Register an extra provider for a role (tests and embedding callers).
    #[doc(hidden)]
    pub fn with_role(mut self, role: &str, spec: String, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(spec.clone(), provider);
        self.role_overrides.insert(role.to_owned(), spec);
        self
    }

    /// Resolve a provider for an optional role.
    ///
    /// # Errors
    ///
    /// Returns an error if no provider can be resolved.
    pub fn resolve(&self, role: Option<&str>) -> Result<Arc<dyn LlmProvider>, RouterError> {
        let selected = self.resolve_spec(role);
        self.providers
            .get(&selected)
            .cloned()
            .ok_or(RouterError::UnavailableProvider { spec: selected })
    }

    /// Resolve a model spec string by optional role.
    pub fn resolve_spec(&self, role: Option<&str>) -> String {
        if let Some(spec) = role
            .and_then(|r| self.role_overrides.get(r))
            .filter(|spec| self.providers.contains_key(*spec))
        {
            return spec.clone();
        }
        self.default.clone()
    }

    /// Returns all available provider specs in sorted order.
    pub fn available_specs(&self) -> Vec<String> {
        let mut values: Vec<String> = self.providers.keys().cloned().collect();
        values.sort();
        values
    }
}

/// A `<provider>/<model>` spec split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedModelSpec {
    /// Provider prefix (`openai`, `ollama`).
    pub provider: String,
    /// Model name passed to the provider.
    pub model: String,
}

/// Split a model spec at its first `/`.
///
/// # Errors
///
/// Returns [`RouterError::InvalidModelSpec`] when either side is empty.
pub fn parse_model_spec(spec: &str) -> Result<ParsedModelSpec, RouterError> {
    let (provider, model) = spec.split_once('/').unwrap_or_default();
    if provider.is_empty() || model.is_empty() {
        return Err(RouterError::InvalidModelSpec {
            spec: spec.to_owned(),
        });
    }
    Ok(ParsedModelSpec {
        provider: provider.to_owned(),
        model: model.to_owned(),
    })
}

fn instantiate_provider(
    model_spec: &str,
    oracle: &OracleConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, RouterError> {
    let parsed = parse_model_spec(model_spec)?;
    match parsed.provider.as_str() {
        "openai" => {
            let key = credentials.get("OPENAI_API_KEY").ok_or_else(|| {
                RouterError::MissingCredential {
                    provider: parsed.provider.clone(),
                    key: "OPENAI_API_KEY".to_owned(),
                }
            })?;
            Ok(Arc::new(OpenAiProvider::new(
                model_spec.to_owned(),
                parsed.model,
                key.to_owned(),
            )))
        }
        "ollama" => Ok(Arc::new(OllamaProvider::new(
            model_spec.to_owned(),
            parsed.model,
            oracle.ollama_url.clone(),
        ))),
        _ => Err(RouterError::UnsupportedProvider {
            provider: parsed.provider,
        }),
    }
}
