//! Static model catalog.
//!
//! This crate provides:
//! - A process-wide registry of providers and their model settings
//! - Lookup helpers for model names and required credential fields
//! - Factories that turn settings into language/embedding model clients
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      Registry                        │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │ OpenAI template                                │  │
//! │  │   language models   │   embedding models       │  │
//! │  └───────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────┘
//!                          │ ModelSettings + credentials
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                      factory                         │
//! │      type tag ──▶ constructor ──▶ Box<dyn Model>     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use model_catalog::providers::LanguageModel;
//! use model_catalog::{Registry, instantiate_language_model, language_model_credential_fields};
//!
//! assert!(language_model_credential_fields("openai-gpt-4").contains("apiKey"));
//!
//! let settings = Registry::global()
//!     .language_model("openai-gpt-4")
//!     .unwrap()
//!     .clone()
//!     .with_credential("apiKey", "sk-...");
//! let model = instantiate_language_model(&settings).unwrap();
//! assert_eq!(model.model_name(), "gpt-4");
//! ```

mod error;
mod types;

pub mod auth;
pub mod factory;
pub mod providers;
pub mod registry;

pub use error::{Error, Result};
pub use factory::{instantiate_embedding_model, instantiate_language_model};
pub use registry::{
    ProviderTemplate, Registry, embedding_model_credential_fields, embedding_model_names,
    language_model_credential_fields, language_model_names,
};
pub use types::{
    EmbeddingModelType, EmbeddingSettings, LanguageModelType, ModelSettings, Provider,
};
