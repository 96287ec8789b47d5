//! Model client traits and implementations.
//!
//! Every catalog type tag resolves to a client that implements either
//! [`LanguageModel`] or [`EmbeddingModel`]. The factories in
//! [`crate::factory`] hand these out as boxed trait objects, so callers never
//! name a concrete client type.
//!
//! # Example
//!
//! ```ignore
//! use model_catalog::{Registry, instantiate_language_model};
//!
//! let settings = Registry::global()
//!     .language_model("openai-gpt-4")
//!     .unwrap()
//!     .clone()
//!     .with_credential("apiKey", "sk-...");
//!
//! let model = instantiate_language_model(&settings)?;
//! let generation = model.complete("Hello!").await?;
//! println!("{}", generation.text);
//! ```

mod types;

pub mod openai;

use std::fmt;

use async_trait::async_trait;

pub use types::*;

use crate::{Error, Result};

/// A text-generation client.
///
/// Chat-style and completion-style clients share this interface; a
/// completion-style client flattens the message list into one prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync + fmt::Debug {
    /// Returns the provider-side model name (e.g., "gpt-4").
    fn model_name(&self) -> &str;

    /// Generate a reply to a conversation.
    async fn generate(&self, messages: Vec<Message>) -> Result<Generation>;

    /// Generate a reply to a single user prompt.
    async fn complete(&self, prompt: &str) -> Result<Generation> {
        self.generate(vec![Message::user(prompt)]).await
    }
}

/// A text-embedding client producing fixed-size vectors.
#[async_trait]
pub trait EmbeddingModel: Send + Sync + fmt::Debug {
    /// Returns the provider-side model name (e.g., "text-embedding-ada-002").
    fn model_name(&self) -> &str;

    /// Dimensionality of the vectors this model produces.
    fn dimensions(&self) -> u32;

    /// Embed a batch of texts, returning one vector per text in input order.
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Embeddings>;

    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_documents(vec![text.to_string()]).await?;
        embeddings.vectors.pop().ok_or_else(|| {
            Error::ProviderApi(format!("no embedding returned by '{}'", self.model_name()))
        })
    }
}
