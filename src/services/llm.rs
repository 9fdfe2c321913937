//! The language-model capability the gateway talks to.
//!
//! Implementations are opaque request/response clients: one system prompt,
//! an ordered history, fixed sampling parameters, raw text back.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, LlmProvider};

use super::anthropic::AnthropicClient;
use super::ollama::OllamaClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub context_window: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            context_window: 8192,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
    #[error("failed to send request to language model: {0}")]
    Request(#[from] reqwest::Error),
    #[error("language model API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("language model returned an empty response")]
    EmptyResponse,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError>;
}

/// Build the client selected by `LLM_PROVIDER`.
pub fn from_config(config: &AppConfig) -> Arc<dyn LanguageModel> {
    match config.provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            config.base_url.clone(),
            config.model.clone(),
        )),
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(
            config.anthropic_api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
    }
}
