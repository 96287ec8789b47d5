//! Error types for the model catalog.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while instantiating or calling catalog models.
#[derive(Debug, Error)]
pub enum Error {
    /// No language model constructor is registered for this type tag.
    #[error("unsupported model type: {0}")]
    UnsupportedModelType(String),

    /// No embedding model constructor is registered for this type tag.
    #[error("unsupported embedding type: {0}")]
    UnsupportedEmbeddingType(String),

    /// Construction arguments could not be interpreted by the client.
    #[error("invalid model arguments: {0}")]
    InvalidArgs(String),

    /// No API key was supplied for a credential field.
    #[error("credentials not found: {0}")]
    CredentialsNotFound(String),

    /// Provider API error.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
