//! Configuration loading and validation.
//!
//! Configuration lives in `lawlord.toml` (`$LAWLORD_CONFIG` or
//! `~/.lawlord/lawlord.toml`). Every section is optional.
//!
//! Precedence: env vars > config file > defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::intake::policy::{ReadinessGuard, ReclassificationPolicy};
use crate::providers::ollama::DEFAULT_OLLAMA_URL;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Firm identity used in prompts and greetings.
    pub firm: FirmConfig,

    /// Model routing configuration.
    pub models: ModelsConfig,

    /// Oracle call parameters.
    pub oracle: OracleConfig,

    /// Interview behaviour.
    pub intake: IntakeConfig,

    /// HTTP transport settings.
    pub server: ServerConfig,

    /// Filesystem locations.
    pub paths: PathsConfig,
}

/// Firm identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirmConfig {
    /// Firm name shown to callers and attorneys.
    pub name: String,

    /// One-line description of the practice, embedded in prompts.
    pub practice: String,
}

impl Default for FirmConfig {
    fn default() -> Self {
        Self {
            name: "Law Office".to_owned(),
            practice: "a Texas criminal defense law firm".to_owned(),
        }
    }
}

/// Model routing: default model plus per-role overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Default model spec (e.g. "openai/gpt-4o-mini").
    pub default: String,

    /// Per-role model overrides (`extraction`, `report`).
    pub roles: HashMap<String, String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default: default_model(),
            roles: HashMap::new(),
        }
    }
}

/// Oracle call parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Sampling temperature for every oracle call.
    pub temperature: f32,

    /// Token cap for extraction turns.
    pub extraction_max_tokens: u32,

    /// Token cap for report generation.
    pub report_max_tokens: u32,

    /// Ollama server base URL.
    pub ollama_url: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            extraction_max_tokens: 1024,
            report_max_tokens: 2048,
            ollama_url: DEFAULT_OLLAMA_URL.to_owned(),
        }
    }
}

/// Interview behaviour knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Confidence the oracle must strictly exceed before a case type is set.
    pub classification_threshold: f64,

    /// Number of missing facts rendered into a fact-gathering prompt.
    pub max_prompt_facts: usize,

    /// Per-turn character cap for transcripts embedded in the report prompt.
    pub transcript_turn_chars: usize,

    /// Whether a locked case type may be replaced by a later proposal.
    pub reclassification: ReclassificationPolicy,

    /// Whether oracle-signaled readiness is verified before finalizing.
    pub readiness_guard: ReadinessGuard,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            classification_threshold: 0.7,
            max_prompt_facts: 6,
            transcript_turn_chars: 300,
            reclassification: ReclassificationPolicy::default(),
            readiness_guard: ReadinessGuard::default(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,

    /// Sessions untouched for this many minutes are evicted; 0 disables eviction.
    pub session_idle_minutes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_owned(),
            session_idle_minutes: 120,
        }
    }
}

/// Filesystem locations; unset entries resolve under `~/.lawlord/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for rotated JSON logs.
    pub logs_dir: Option<PathBuf>,

    /// `.env` file holding provider credentials.
    pub env_file: Option<PathBuf>,
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_owned()
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// A missing config file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if the resulting configuration is invalid.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let path = match env("LAWLORD_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => config_dir()?.join("lawlord.toml"),
        };

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "loading config from file");
            load_config(&path)?
        } else {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            Self::default()
        };

        config.apply_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("LAWLORD_FIRM_NAME") {
            self.firm.name = v;
        }
        if let Some(v) = env("LAWLORD_MODEL") {
            self.models.default = v;
        }
        if let Some(v) = env("LAWLORD_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env("LAWLORD_CLASSIFICATION_THRESHOLD") {
            match v.parse() {
                Ok(n) => self.intake.classification_threshold = n,
                Err(_) => tracing::warn!(
                    var = "LAWLORD_CLASSIFICATION_THRESHOLD",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.intake.classification_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("intake.classification_threshold must be within [0, 1], got {threshold}");
        }
        if self.intake.max_prompt_facts == 0 {
            anyhow::bail!("intake.max_prompt_facts must be at least 1");
        }
        for spec in std::iter::once(&self.models.default).chain(self.models.roles.values()) {
            crate::providers::router::parse_model_spec(spec)?;
        }
        Ok(())
    }

    /// Resolved log directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn logs_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.paths.logs_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }

    /// Resolved credentials file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn env_file(&self) -> anyhow::Result<PathBuf> {
        match &self.paths.env_file {
            Some(file) => Ok(file.clone()),
            None => Ok(config_dir()?.join(".env")),
        }
    }
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config at {}", path.display()))?;
    Ok(config)
}

/// Resolve the default config directory (`~/.lawlord/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".lawlord"))
}
