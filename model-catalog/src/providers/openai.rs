//! OpenAI model clients.
//!
//! Three clients back the OpenAI catalog entries:
//!
//! - [`OpenAIChat`] for `chat-completion` entries (`/chat/completions`)
//! - [`OpenAICompletion`] for `completion` entries (`/completions`)
//! - [`OpenAIEmbeddings`] for `embedding` entries (`/embeddings`)
//!
//! Clients are configured entirely from the settings `args` object and
//! perform no I/O until a request is made.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{EmbeddingModel, Embeddings, Generation, LanguageModel, Message, StopReason, Usage};
use crate::auth::{API_KEY_FIELD, ApiKey, resolve_api_key};
use crate::{EmbeddingSettings, Error, ModelSettings, Result};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of texts sent per embeddings request.
const DEFAULT_BATCH_SIZE: usize = 512;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Client configuration read from settings `args`.
///
/// Unknown keys are ignored so catalog entries can carry arguments meant for
/// other consumers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAIConfig {
    /// Provider-side model name.
    pub model_name: String,
    /// Maximum tokens to generate.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Texts per embeddings request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl OpenAIConfig {
    /// Parse configuration from a settings `args` object.
    pub fn from_args(args: &Map<String, Value>) -> Result<Self> {
        let config: Self = serde_json::from_value(Value::Object(args.clone()))
            .map_err(|e| Error::InvalidArgs(e.to_string()))?;
        if config.batch_size == 0 {
            return Err(Error::InvalidArgs("batchSize must be positive".to_string()));
        }
        Ok(config)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP plumbing
// ────────────────────────────────────────────────────────────────────────────

/// Authenticated HTTP access to the OpenAI API.
#[derive(Debug, Clone)]
struct OpenAIHttp {
    base_url: String,
    api_key: Option<ApiKey>,
    client: reqwest::Client,
}

impl OpenAIHttp {
    fn new(settings: &ModelSettings, config: &OpenAIConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: resolve_api_key(&settings.credentials, settings.provider).map(|(k, _)| k),
            client,
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::CredentialsNotFound(format!("openai {API_KEY_FIELD}")))?;

        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "sending OpenAI request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ProviderApi(format!(
                "OpenAI API returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Request(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI API Types
// ────────────────────────────────────────────────────────────────────────────

/// Token usage as reported by OpenAI.
#[derive(Debug, Default, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl From<OpenAIUsage> for Usage {
    fn from(usage: OpenAIUsage) -> Self {
        Usage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from `/chat/completions`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Convert the first choice to a `Generation`.
    pub fn into_generation(self) -> Result<Generation> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::ProviderApi("no choices in chat completion".to_string()))?;

        Ok(Generation {
            text: choice.message.content.unwrap_or_default(),
            stop_reason: choice
                .finish_reason
                .as_deref()
                .and_then(StopReason::from_finish_reason),
            usage: self.usage.into(),
        })
    }
}

/// Request body for `/completions`.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response from `/completions`.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Convert the first choice to a `Generation`.
    pub fn into_generation(self) -> Result<Generation> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::ProviderApi("no choices in completion".to_string()))?;

        Ok(Generation {
            text: choice.text,
            stop_reason: choice
                .finish_reason
                .as_deref()
                .and_then(StopReason::from_finish_reason),
            usage: self.usage.into(),
        })
    }
}

/// Request body for `/embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

/// Response from `/embeddings`.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors ordered by input index, plus token usage.
    pub fn into_parts(mut self) -> (Vec<Vec<f32>>, Usage) {
        self.data.sort_by_key(|d| d.index);
        let vectors = self.data.into_iter().map(|d| d.embedding).collect();
        (vectors, self.usage.into())
    }
}

/// Flatten a conversation into a single completion prompt.
fn prompt_from_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Clients
// ────────────────────────────────────────────────────────────────────────────

/// Chat-completion client (`gpt-3.5-turbo`, `gpt-4`).
#[derive(Debug)]
pub struct OpenAIChat {
    config: OpenAIConfig,
    http: OpenAIHttp,
}

impl OpenAIChat {
    /// Build a client from catalog settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let config = OpenAIConfig::from_args(&settings.args)?;
        let http = OpenAIHttp::new(settings, &config)?;
        Ok(Self { config, http })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn generate(&self, messages: Vec<Message>) -> Result<Generation> {
        let request = ChatCompletionRequest {
            model: &self.config.model_name,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let response: ChatCompletionResponse =
            self.http.post("/chat/completions", &request).await?;
        response.into_generation()
    }
}

/// Completion-style client (`text-davinci-003`).
#[derive(Debug)]
pub struct OpenAICompletion {
    config: OpenAIConfig,
    http: OpenAIHttp,
}

impl OpenAICompletion {
    /// Build a client from catalog settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let config = OpenAIConfig::from_args(&settings.args)?;
        let http = OpenAIHttp::new(settings, &config)?;
        Ok(Self { config, http })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LanguageModel for OpenAICompletion {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn generate(&self, messages: Vec<Message>) -> Result<Generation> {
        let request = CompletionRequest {
            model: &self.config.model_name,
            prompt: prompt_from_messages(&messages),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let response: CompletionResponse = self.http.post("/completions", &request).await?;
        response.into_generation()
    }
}

/// Embeddings client (`text-embedding-ada-002`).
#[derive(Debug)]
pub struct OpenAIEmbeddings {
    config: OpenAIConfig,
    dimensions: u32,
    http: OpenAIHttp,
}

impl OpenAIEmbeddings {
    /// Build a client from catalog settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let config = OpenAIConfig::from_args(&settings.settings.args)?;
        let http = OpenAIHttp::new(&settings.settings, &config)?;
        Ok(Self {
            config,
            dimensions: settings.embedding_size,
            http,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl EmbeddingModel for OpenAIEmbeddings {
    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }

    async fn embed_documents(&self, texts: Vec<String>) -> Result<Embeddings> {
        let mut vectors = Vec::with_capacity(texts.len());
        let mut usage = Usage::default();

        for batch in texts.chunks(self.config.batch_size) {
            let request = EmbeddingRequest {
                model: &self.config.model_name,
                input: batch,
            };
            let response: EmbeddingResponse = self.http.post("/embeddings", &request).await?;
            let (batch, batch_usage) = response.into_parts();
            usage = Usage::new(
                usage.input_tokens + batch_usage.input_tokens,
                usage.output_tokens + batch_usage.output_tokens,
            );
            vectors.extend(batch);
        }

        if let Some(v) = vectors.iter().find(|v| v.len() != self.dimensions as usize) {
            warn!(
                model = %self.config.model_name,
                expected = self.dimensions,
                actual = v.len(),
                "embedding size differs from catalog"
            );
        }

        Ok(Embeddings { vectors, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmbeddingModelType, LanguageModelType, Provider};

    fn chat_settings() -> ModelSettings {
        ModelSettings::language_model(
            LanguageModelType::ChatCompletion,
            Provider::OpenAI,
            "openai-gpt-4",
        )
        .arg("modelName", "gpt-4")
        .arg("maxTokens", 1500)
        .credential_field(API_KEY_FIELD)
    }

    #[test]
    fn config_applies_defaults() {
        let config = OpenAIConfig::from_args(&chat_settings().args).unwrap();
        assert_eq!(config.model_name, "gpt-4");
        assert_eq!(config.max_tokens, Some(1500));
        assert_eq!(config.temperature, None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.batch_size, 512);
    }

    #[test]
    fn config_ignores_unknown_args() {
        let settings = chat_settings().arg("streaming", true);
        assert!(OpenAIConfig::from_args(&settings.args).is_ok());
    }

    #[test]
    fn config_requires_model_name() {
        let err = OpenAIConfig::from_args(&Map::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
        assert!(err.to_string().contains("modelName"));
    }

    #[test]
    fn config_rejects_wrong_types() {
        let settings = chat_settings().arg("maxTokens", "lots");
        let err = OpenAIConfig::from_args(&settings.args).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn config_rejects_zero_batch_size() {
        let settings = chat_settings().arg("batchSize", 0);
        let err = OpenAIConfig::from_args(&settings.args).unwrap_err();
        assert!(err.to_string().contains("batchSize"));
    }

    #[test]
    fn chat_client_uses_supplied_key() {
        let settings = chat_settings().with_credential(API_KEY_FIELD, "sk-test");
        let client = OpenAIChat::from_settings(&settings).unwrap();

        assert_eq!(client.model_name(), "gpt-4");
        assert_eq!(client.http.api_key.as_ref().unwrap().expose_secret(), "sk-test");
        assert_eq!(client.http.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let settings = chat_settings().arg("baseUrl", "http://localhost:8080/v1/");
        let client = OpenAIChat::from_settings(&settings).unwrap();
        assert_eq!(client.http.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn embeddings_client_reports_catalog_dimensions() {
        let settings = EmbeddingSettings::new(
            EmbeddingModelType::Embedding,
            Provider::OpenAI,
            "openai-text-embedding-ada-002",
            1536,
        )
        .arg("modelName", "text-embedding-ada-002");
        let client = OpenAIEmbeddings::from_settings(&settings).unwrap();

        assert_eq!(client.model_name(), "text-embedding-ada-002");
        assert_eq!(client.dimensions(), 1536);
    }

    #[test]
    fn chat_request_serializes_without_empty_options() {
        let messages = vec![Message::system("Be terse"), Message::user("Hi")];
        let request = ChatCompletionRequest {
            model: "gpt-4",
            messages: &messages,
            max_tokens: Some(1500),
            temperature: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hi");
        assert_eq!(json["max_tokens"], 1500);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn parse_chat_response_extracts_content() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let generation = response.into_generation().unwrap();

        assert_eq!(generation.text, "Hello there!");
        assert_eq!(generation.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(generation.usage, Usage::new(9, 3));
    }

    #[test]
    fn chat_response_without_choices_is_an_error() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            response.into_generation(),
            Err(Error::ProviderApi(_))
        ));
    }

    #[test]
    fn parse_completion_response_extracts_text() {
        let json = r#"{
            "choices": [{"text": "\n\nThis is a test.", "index": 0, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
        }"#;

        let response: CompletionResponse = serde_json::from_str(json).unwrap();
        let generation = response.into_generation().unwrap();

        assert_eq!(generation.text, "\n\nThis is a test.");
        assert_eq!(generation.stop_reason, Some(StopReason::MaxTokens));
        assert_eq!(generation.usage.total_tokens, 12);
    }

    #[test]
    fn completion_prompt_joins_messages() {
        let prompt =
            prompt_from_messages(&[Message::system("You are a poet."), Message::user("Rain")]);
        assert_eq!(prompt, "You are a poet.\n\nRain");
    }

    #[test]
    fn embedding_response_orders_by_index() {
        let json = r#"{
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.3, 0.4]},
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}
            ],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;

        let response: EmbeddingResponse = serde_json::from_str(json).unwrap();
        let (vectors, usage) = response.into_parts();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        assert_eq!(usage.input_tokens, 4);
    }

    #[tokio::test]
    async fn request_without_key_fails_before_network() {
        let mut client = OpenAIChat::from_settings(&chat_settings()).unwrap();
        client.http.api_key = None;

        let err = client.complete("Hello").await.unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound(_)));
    }

    // ────────────────────────────────────────────────────────────────────────────
    // Integration Tests (require an OpenAI API key)
    // ────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY"]
    async fn integration_chat_sends_request_to_openai() {
        let client = OpenAIChat::from_settings(&chat_settings().arg("maxTokens", 16)).unwrap();
        let generation = client
            .complete("Say 'hello' and nothing else.")
            .await
            .expect("chat should succeed");

        println!("Response: {}", generation.text);
        assert!(!generation.text.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires OPENAI_API_KEY"]
    async fn integration_embeddings_match_catalog_size() {
        let settings = EmbeddingSettings::new(
            EmbeddingModelType::Embedding,
            Provider::OpenAI,
            "openai-text-embedding-ada-002",
            1536,
        )
        .arg("modelName", "text-embedding-ada-002");
        let client = OpenAIEmbeddings::from_settings(&settings).unwrap();

        let vector = client.embed_query("hello").await.expect("embed should succeed");
        assert_eq!(vector.len(), 1536);
    }
}
