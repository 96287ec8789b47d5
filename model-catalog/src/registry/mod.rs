//! Static model registry.
//!
//! The registry is the built-in catalog of providers and their model
//! settings. It is built once on first access and never mutated, so it can be
//! read from any thread without locking.
//!
//! Lookups key on the entry name alone. Names must be unique across the whole
//! registry; if they are not, the first entry in provider-then-entry
//! declaration order wins.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use crate::auth::API_KEY_FIELD;
use crate::{EmbeddingModelType, EmbeddingSettings, LanguageModelType, ModelSettings, Provider};

/// Max tokens configured for every built-in OpenAI language model.
const OPENAI_MAX_TOKENS: u32 = 1500;

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// All settings belonging to one provider.
#[derive(Debug, Clone)]
pub struct ProviderTemplate {
    /// The provider.
    pub provider: Provider,
    /// Language model entries, in declaration order.
    pub language_models: Vec<ModelSettings>,
    /// Embedding model entries, in declaration order.
    pub embedding_models: Vec<EmbeddingSettings>,
}

/// Catalog of providers and their model settings.
#[derive(Debug, Clone)]
pub struct Registry {
    providers: Vec<ProviderTemplate>,
}

impl Registry {
    /// Get the process-wide built-in registry.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Create a registry from provider templates.
    pub fn new(providers: Vec<ProviderTemplate>) -> Self {
        Self { providers }
    }

    fn builtin() -> Self {
        Self::new(vec![openai_template()])
    }

    /// Provider templates, in declaration order.
    pub fn providers(&self) -> &[ProviderTemplate] {
        &self.providers
    }

    /// Iterate over all language model entries.
    pub fn language_models(&self) -> impl Iterator<Item = &ModelSettings> {
        self.providers.iter().flat_map(|p| &p.language_models)
    }

    /// Iterate over all embedding model entries.
    pub fn embedding_models(&self) -> impl Iterator<Item = &EmbeddingSettings> {
        self.providers.iter().flat_map(|p| &p.embedding_models)
    }

    /// Names of all language models.
    pub fn language_model_names(&self) -> Vec<&str> {
        self.language_models().map(|s| s.name.as_str()).collect()
    }

    /// Names of all embedding models.
    pub fn embedding_model_names(&self) -> Vec<&str> {
        self.embedding_models().map(EmbeddingSettings::name).collect()
    }

    /// Find a language model entry by name.
    pub fn language_model(&self, name: &str) -> Option<&ModelSettings> {
        self.language_models().find(|s| s.name == name)
    }

    /// Find an embedding model entry by name.
    pub fn embedding_model(&self, name: &str) -> Option<&EmbeddingSettings> {
        self.embedding_models().find(|s| s.name() == name)
    }

    /// Credential fields of a language model, empty if the name is unknown.
    pub fn language_model_credential_fields(&self, name: &str) -> BTreeSet<&str> {
        self.language_model(name)
            .map(|s| s.credentials.fields().collect())
            .unwrap_or_default()
    }

    /// Credential fields of an embedding model, empty if the name is unknown.
    pub fn embedding_model_credential_fields(&self, name: &str) -> BTreeSet<&str> {
        self.embedding_model(name)
            .map(|s| s.settings.credentials.fields().collect())
            .unwrap_or_default()
    }

    /// Names that appear on more than one entry, across both kinds.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let names = self
            .language_models()
            .map(|s| s.name.as_str())
            .chain(self.embedding_models().map(EmbeddingSettings::name));

        for name in names {
            if !seen.insert(name) && !duplicates.contains(&name) {
                duplicates.push(name);
            }
        }
        duplicates
    }
}

fn openai_language_model(model_type: LanguageModelType, name: &str, model: &str) -> ModelSettings {
    ModelSettings::language_model(model_type, Provider::OpenAI, name)
        .arg("modelName", model)
        .arg("maxTokens", OPENAI_MAX_TOKENS)
        .credential_field(API_KEY_FIELD)
}

fn openai_template() -> ProviderTemplate {
    ProviderTemplate {
        provider: Provider::OpenAI,
        language_models: vec![
            openai_language_model(
                LanguageModelType::ChatCompletion,
                "openai-gpt-3.5-turbo",
                "gpt-3.5-turbo",
            ),
            openai_language_model(LanguageModelType::ChatCompletion, "openai-gpt-4", "gpt-4"),
            openai_language_model(
                LanguageModelType::Completion,
                "openai-text-davinci-003",
                "text-davinci-003",
            ),
        ],
        embedding_models: vec![
            EmbeddingSettings::new(
                EmbeddingModelType::Embedding,
                Provider::OpenAI,
                "openai-text-embedding-ada-002",
                1536,
            )
            .arg("modelName", "text-embedding-ada-002")
            .credential_field(API_KEY_FIELD),
        ],
    }
}

/// Names of all language models in the built-in registry.
pub fn language_model_names() -> Vec<&'static str> {
    Registry::global().language_model_names()
}

/// Names of all embedding models in the built-in registry.
pub fn embedding_model_names() -> Vec<&'static str> {
    Registry::global().embedding_model_names()
}

/// Credential fields of a built-in language model, empty if unknown.
pub fn language_model_credential_fields(name: &str) -> BTreeSet<&'static str> {
    Registry::global().language_model_credential_fields(name)
}

/// Credential fields of a built-in embedding model, empty if unknown.
pub fn embedding_model_credential_fields(name: &str) -> BTreeSet<&'static str> {
    Registry::global().embedding_model_credential_fields(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_language_models_in_declaration_order() {
        assert_eq!(
            language_model_names(),
            vec![
                "openai-gpt-3.5-turbo",
                "openai-gpt-4",
                "openai-text-davinci-003"
            ]
        );
    }

    #[test]
    fn builtin_embedding_models() {
        assert_eq!(embedding_model_names(), vec!["openai-text-embedding-ada-002"]);
    }

    #[test]
    fn builtin_entries_carry_catalog_args() {
        let registry = Registry::global();

        let davinci = registry.language_model("openai-text-davinci-003").unwrap();
        assert_eq!(davinci.model_type, "completion");
        assert_eq!(davinci.provider, Provider::OpenAI);
        assert_eq!(davinci.args["modelName"], "text-davinci-003");
        assert_eq!(davinci.args["maxTokens"], 1500);

        let ada = registry
            .embedding_model("openai-text-embedding-ada-002")
            .unwrap();
        assert_eq!(ada.settings.model_type, "embedding");
        assert_eq!(ada.embedding_size, 1536);
        assert_eq!(ada.settings.args["modelName"], "text-embedding-ada-002");
        assert!(ada.settings.args.get("maxTokens").is_none());
    }

    #[test]
    fn builtin_credentials_are_placeholders() {
        let registry = Registry::global();
        for settings in registry.language_models() {
            assert_eq!(settings.missing_credentials(), vec![API_KEY_FIELD]);
        }
        for settings in registry.embedding_models() {
            assert_eq!(settings.settings.missing_credentials(), vec![API_KEY_FIELD]);
        }
    }

    #[test]
    fn builtin_names_are_unique() {
        assert!(Registry::global().duplicate_names().is_empty());
    }

    #[test]
    fn lookup_is_kind_specific() {
        assert!(language_model_credential_fields("openai-text-embedding-ada-002").is_empty());
        assert!(embedding_model_credential_fields("openai-gpt-4").is_empty());
    }

    #[test]
    fn duplicate_names_resolve_to_first_entry() {
        let first = ModelSettings::language_model(
            LanguageModelType::ChatCompletion,
            Provider::OpenAI,
            "shared",
        )
        .credential_field("apiKey");
        let second =
            ModelSettings::language_model(LanguageModelType::Completion, Provider::OpenAI, "shared")
                .credential_field("organization");

        let registry = Registry::new(vec![
            ProviderTemplate {
                provider: Provider::OpenAI,
                language_models: vec![first],
                embedding_models: vec![],
            },
            ProviderTemplate {
                provider: Provider::OpenAI,
                language_models: vec![second],
                embedding_models: vec![],
            },
        ]);

        assert_eq!(registry.duplicate_names(), vec!["shared"]);
        assert_eq!(
            registry.language_model("shared").unwrap().model_type,
            "chat-completion"
        );
        assert_eq!(
            registry.language_model_credential_fields("shared"),
            BTreeSet::from(["apiKey"])
        );
    }
}
