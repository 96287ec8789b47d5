//! Client factories.
//!
//! Each type tag maps to one constructor. The tables below are the single
//! seam between the catalog and concrete client implementations; adding a
//! client means adding a variant to the tag enum and a row here.

use tracing::{debug, warn};

use crate::providers::openai::{OpenAIChat, OpenAICompletion, OpenAIEmbeddings};
use crate::providers::{EmbeddingModel, LanguageModel};
use crate::{EmbeddingModelType, EmbeddingSettings, Error, LanguageModelType, ModelSettings, Result};

/// Constructor for a language model client.
pub type LanguageModelFactory = fn(&ModelSettings) -> Result<Box<dyn LanguageModel>>;

/// Constructor for an embedding model client.
pub type EmbeddingModelFactory = fn(&EmbeddingSettings) -> Result<Box<dyn EmbeddingModel>>;

const LANGUAGE_MODEL_FACTORIES: &[(LanguageModelType, LanguageModelFactory)] = &[
    (
        LanguageModelType::ChatCompletion,
        openai_chat as LanguageModelFactory,
    ),
    (
        LanguageModelType::Completion,
        openai_completion as LanguageModelFactory,
    ),
];

const EMBEDDING_MODEL_FACTORIES: &[(EmbeddingModelType, EmbeddingModelFactory)] = &[(
    EmbeddingModelType::Embedding,
    openai_embeddings as EmbeddingModelFactory,
)];

fn openai_chat(settings: &ModelSettings) -> Result<Box<dyn LanguageModel>> {
    Ok(Box::new(OpenAIChat::from_settings(settings)?))
}

fn openai_completion(settings: &ModelSettings) -> Result<Box<dyn LanguageModel>> {
    Ok(Box::new(OpenAICompletion::from_settings(settings)?))
}

fn openai_embeddings(settings: &EmbeddingSettings) -> Result<Box<dyn EmbeddingModel>> {
    Ok(Box::new(OpenAIEmbeddings::from_settings(settings)?))
}

/// Look up the constructor for a language model type tag.
pub fn language_model_factory(tag: &str) -> Option<LanguageModelFactory> {
    let model_type = LanguageModelType::parse(tag)?;
    LANGUAGE_MODEL_FACTORIES
        .iter()
        .find(|(t, _)| *t == model_type)
        .map(|(_, f)| *f)
}

/// Look up the constructor for an embedding model type tag.
pub fn embedding_model_factory(tag: &str) -> Option<EmbeddingModelFactory> {
    let model_type = EmbeddingModelType::parse(tag)?;
    EMBEDDING_MODEL_FACTORIES
        .iter()
        .find(|(t, _)| *t == model_type)
        .map(|(_, f)| *f)
}

/// Construct a language model client from settings.
///
/// # Errors
///
/// Returns `Error::UnsupportedModelType` if no constructor is registered for
/// `settings.model_type`. Errors raised by the client constructor itself are
/// returned unchanged.
pub fn instantiate_language_model(settings: &ModelSettings) -> Result<Box<dyn LanguageModel>> {
    let Some(factory) = language_model_factory(&settings.model_type) else {
        warn!(name = %settings.name, model_type = %settings.model_type, "unsupported model type");
        return Err(Error::UnsupportedModelType(settings.model_type.clone()));
    };

    let model = factory(settings)?;
    debug!(name = %settings.name, model_type = %settings.model_type, "instantiated language model");
    Ok(model)
}

/// Construct an embedding model client from settings.
///
/// # Errors
///
/// Returns `Error::UnsupportedEmbeddingType` if no constructor is registered
/// for the settings type tag. Errors raised by the client constructor itself
/// are returned unchanged.
pub fn instantiate_embedding_model(
    settings: &EmbeddingSettings,
) -> Result<Box<dyn EmbeddingModel>> {
    let tag = &settings.settings.model_type;
    let Some(factory) = embedding_model_factory(tag) else {
        warn!(name = %settings.name(), model_type = %tag, "unsupported embedding type");
        return Err(Error::UnsupportedEmbeddingType(tag.clone()));
    };

    let model = factory(settings)?;
    debug!(name = %settings.name(), model_type = %tag, "instantiated embedding model");
    Ok(model)
}
