//! Credential fields and API key handling.
//!
//! Catalog entries declare which credential fields a caller must supply
//! (for OpenAI, just `apiKey`). The catalog itself only holds placeholders;
//! callers fill them in before instantiating a client.
//!
//! # Example
//!
//! ```
//! use model_catalog::auth::{ApiKey, Credentials};
//!
//! let mut credentials = Credentials::required(["apiKey"]);
//! assert_eq!(credentials.missing(), vec!["apiKey"]);
//!
//! credentials.set("apiKey", ApiKey::new("sk-..."));
//! assert!(credentials.missing().is_empty());
//! ```

use std::collections::BTreeMap;
use std::env;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::Provider;

/// Credential field holding a provider API key.
pub const API_KEY_FIELD: &str = "apiKey";

/// A secure API key that prevents accidental logging.
///
/// The key is wrapped in `SecretString` which:
/// - Implements `Debug` as `"[REDACTED]"`
/// - Zeroizes memory on drop
/// - Requires explicit `.expose_secret()` to access the value
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Expose the secret key value.
    ///
    /// Use sparingly - only when actually sending to an API.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Credential fields of a settings entry, keyed by field name.
///
/// A `None` value is a placeholder the caller still has to fill in.
/// Serializing never writes secret values; every field comes out as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, Option<ApiKey>>);

impl Credentials {
    /// Create credentials with the given fields, all unset.
    pub fn required<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(|f| (f.into(), None)).collect())
    }

    /// Names of all declared credential fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Declare a field, leaving any supplied value in place.
    pub fn declare(&mut self, field: impl Into<String>) {
        self.0.entry(field.into()).or_insert(None);
    }

    /// Supply a value for a field, declaring it if it was not declared.
    pub fn set(&mut self, field: impl Into<String>, key: ApiKey) {
        self.0.insert(field.into(), Some(key));
    }

    /// Get the value supplied for a field, if any.
    pub fn get(&self, field: &str) -> Option<&ApiKey> {
        self.0.get(field).and_then(Option::as_ref)
    }

    /// Fields that are declared but still unset.
    pub fn missing(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.keys().map(|k| (k, Option::<()>::None)))
    }
}

/// Environment variable names for each provider.
const ENV_VARS: &[(Provider, &str)] = &[(Provider::OpenAI, "OPENAI_API_KEY")];

/// Get the environment variable name for a provider.
pub fn env_var_for_provider(provider: Provider) -> Option<&'static str> {
    ENV_VARS
        .iter()
        .find(|(p, _)| *p == provider)
        .map(|(_, v)| *v)
}

/// Source of a resolved API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Supplied by the caller in the settings credentials.
    Supplied,
    /// From environment variable.
    Environment,
}

/// Resolve the API key for a provider.
///
/// Uses the caller-supplied `apiKey` field first, then the provider's
/// environment variable. Returns `None` if neither is set; clients report
/// that at request time.
pub fn resolve_api_key(
    credentials: &Credentials,
    provider: Provider,
) -> Option<(ApiKey, CredentialSource)> {
    if let Some(key) = credentials.get(API_KEY_FIELD) {
        debug!(%provider, "using supplied API key");
        return Some((key.clone(), CredentialSource::Supplied));
    }

    let env_var = env_var_for_provider(provider)?;
    let key = env::var(env_var).ok()?;
    debug!(%provider, env_var, "using API key from environment");
    Some((ApiKey::new(key), CredentialSource::Environment))
}
