//! Credential loading from an optional `.env` file and the process environment.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Environment keys consulted by the provider router.
const KNOWN_KEYS: &[&str] = &["OPENAI_API_KEY"];

/// Provider credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a non-blank credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Load credentials from `path` (if it exists), then overlay process env.
///
/// Process environment wins over the file so deployments can inject keys
/// without touching disk.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    load_credentials_with(path, |key| std::env::var(key).ok())
}

/// Load credentials with a custom env resolver (for testing).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_credentials_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Credentials> {
    let mut vars = BTreeMap::new();

    if path.exists() {
        let iter = dotenvy::from_path_iter(path)
            .with_context(|| format!("failed to read credentials at {}", path.display()))?;
        for item in iter {
            let (key, value) = item.with_context(|| {
                format!(
                    "failed to parse key-value entry in credentials file {}",
                    path.display()
                )
            })?;
            vars.insert(key, value);
        }
        debug!(path = %path.display(), count = vars.len(), "loaded credentials file");
    }

    for key in KNOWN_KEYS {
        if let Some(value) = env(key) {
            vars.insert((*key).to_owned(), value);
        }
    }

    Ok(Credentials { vars })
}
