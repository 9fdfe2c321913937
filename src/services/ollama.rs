use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::llm::{ChatTurn, LanguageModel, LlmError, SamplingConfig};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
// Reasoning model; its <think> segments are stripped by the gateway.
const DEFAULT_MODEL: &str = "deepseek-r1:8b";

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
    options: Options,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options {
    temperature: f32,
    num_predict: u32,
    num_ctx: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Client for a local Ollama server's `/api/chat` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message {
            role: "system",
            content: system_prompt,
        });
        messages.extend(history.iter().map(|turn| Message {
            role: turn.role.as_str(),
            content: &turn.content,
        }));

        let request_body = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: Options {
                temperature: sampling.temperature,
                num_predict: sampling.max_tokens,
                num_ctx: sampling.context_window,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url.trim_end_matches('/')))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Api { status, body });
        }

        let ollama_response: OllamaResponse = response.json().await?;

        match ollama_response.message {
            Some(message) if !message.content.trim().is_empty() => Ok(message.content),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}
