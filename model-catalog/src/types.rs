//! Core types for the model catalog.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::{ApiKey, Credentials};

/// A model vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// OpenAI.
    #[serde(rename = "openai")]
    OpenAI,
}

impl Provider {
    /// Get the provider identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete type of a language model entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageModelType {
    /// Chat-style completion over a message list.
    ChatCompletion,
    /// Single-prompt text completion.
    Completion,
}

impl LanguageModelType {
    /// Get the type tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LanguageModelType::ChatCompletion => "chat-completion",
            LanguageModelType::Completion => "completion",
        }
    }

    /// Parse a type tag, returning `None` for unknown tags.
    ///
    /// ```
    /// use model_catalog::LanguageModelType;
    ///
    /// assert_eq!(
    ///     LanguageModelType::parse("chat-completion"),
    ///     Some(LanguageModelType::ChatCompletion)
    /// );
    /// assert_eq!(LanguageModelType::parse("unknown-type"), None);
    /// ```
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "chat-completion" => Some(LanguageModelType::ChatCompletion),
            "completion" => Some(LanguageModelType::Completion),
            _ => None,
        }
    }
}

impl fmt::Display for LanguageModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete type of an embedding model entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbeddingModelType {
    /// Dense text embeddings.
    Embedding,
}

impl EmbeddingModelType {
    /// Get the type tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EmbeddingModelType::Embedding => "embedding",
        }
    }

    /// Parse a type tag, returning `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "embedding" => Some(EmbeddingModelType::Embedding),
            _ => None,
        }
    }
}

impl fmt::Display for EmbeddingModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one catalog entry.
///
/// The type tag is kept as a string so that settings loaded from outside the
/// catalog can carry tags no constructor knows about; instantiation rejects
/// those with an error instead of failing to deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSettings {
    /// Type tag selecting the client constructor.
    #[serde(rename = "type")]
    pub model_type: String,
    /// Owning provider.
    pub provider: Provider,
    /// Unique human-readable name, the lookup key.
    pub name: String,
    /// Construction arguments passed to the client.
    #[serde(default)]
    pub args: Map<String, Value>,
    /// Credential fields the caller must supply.
    #[serde(default)]
    pub credentials: Credentials,
}

impl ModelSettings {
    /// Create settings for a language model entry.
    pub fn language_model(
        model_type: LanguageModelType,
        provider: Provider,
        name: impl Into<String>,
    ) -> Self {
        Self::with_tag(model_type.as_str(), provider, name)
    }

    /// Create settings with a raw type tag.
    pub fn with_tag(tag: impl Into<String>, provider: Provider, name: impl Into<String>) -> Self {
        Self {
            model_type: tag.into(),
            provider,
            name: name.into(),
            args: Map::new(),
            credentials: Credentials::default(),
        }
    }

    /// Set a construction argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Declare a credential field the caller must supply.
    pub fn credential_field(mut self, field: &str) -> Self {
        self.credentials.declare(field);
        self
    }

    /// Supply a value for a credential field.
    pub fn with_credential(mut self, field: &str, key: impl Into<ApiKey>) -> Self {
        self.credentials.set(field, key.into());
        self
    }

    /// Credential fields that have not been supplied yet.
    pub fn missing_credentials(&self) -> Vec<&str> {
        self.credentials.missing()
    }
}

/// Settings for an embedding catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Common settings.
    #[serde(flatten)]
    pub settings: ModelSettings,
    /// Dimensionality of the produced vectors.
    pub embedding_size: u32,
}

impl EmbeddingSettings {
    /// Create settings for an embedding entry.
    pub fn new(
        model_type: EmbeddingModelType,
        provider: Provider,
        name: impl Into<String>,
        embedding_size: u32,
    ) -> Self {
        Self {
            settings: ModelSettings::with_tag(model_type.as_str(), provider, name),
            embedding_size,
        }
    }

    /// Get the entry name.
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Set a construction argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings = self.settings.arg(key, value);
        self
    }

    /// Declare a credential field the caller must supply.
    pub fn credential_field(mut self, field: &str) -> Self {
        self.settings = self.settings.credential_field(field);
        self
    }

    /// Supply a value for a credential field.
    pub fn with_credential(mut self, field: &str, key: impl Into<ApiKey>) -> Self {
        self.settings = self.settings.with_credential(field, key);
        self
    }
}
