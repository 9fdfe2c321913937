//! Boundary between a chat session and the language model.
//!
//! The gateway renders the system prompt, sends the rolling history, strips
//! `<think>` segments from what comes back and decodes the JSON envelope.
//! Every failure (transport, empty text, unbalanced thinking markers, schema
//! mismatch) is folded into a [`GatewayReply`] with `is_error = true`, so the
//! caller only ever handles one failure branch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::entities::message;
use crate::error::{Error, Result};
use crate::validation::{ChatSettings, MESSAGE_MAX_LEN};

use super::envelope::{QuizPayload, ResponseEnvelope};
use super::llm::{ChatTurn, LanguageModel, Role, SamplingConfig};
use super::prompt::system_prompt;

pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't come up with a proper answer. Please try again.";

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub is_error: bool,
    pub wants_quiz: bool,
    pub reply_text: String,
    pub quizzes: Vec<QuizPayload>,
}

impl GatewayReply {
    pub fn failure() -> Self {
        Self {
            is_error: true,
            wants_quiz: false,
            reply_text: FALLBACK_REPLY.to_string(),
            quizzes: Vec::new(),
        }
    }

    fn from_envelope(envelope: ResponseEnvelope) -> Self {
        let response = envelope.response.trim();
        let too_long = response.chars().count() > MESSAGE_MAX_LEN;
        if too_long {
            warn!(
                "Language model response exceeds {} characters; using the fallback reply",
                MESSAGE_MAX_LEN
            );
        }

        if envelope.is_error {
            return Self {
                reply_text: if response.is_empty() || too_long {
                    FALLBACK_REPLY.to_string()
                } else {
                    response.to_string()
                },
                ..Self::failure()
            };
        }

        if too_long {
            return Self::failure();
        }
        if response.is_empty() {
            warn!("Language model returned an envelope with an empty response");
            return Self::failure();
        }

        let mut quizzes = envelope.quizzes;
        for quiz in &mut quizzes {
            quiz.normalize();
        }

        Self {
            is_error: false,
            wants_quiz: envelope.wants_quiz,
            reply_text: response.to_string(),
            quizzes,
        }
    }
}

pub struct Gateway {
    model: Arc<dyn LanguageModel>,
    sampling: SamplingConfig,
    history_limit: Option<usize>,
}

impl Gateway {
    pub fn new(model: Arc<dyn LanguageModel>, sampling: SamplingConfig) -> Self {
        Self {
            model,
            sampling,
            history_limit: None,
        }
    }

    /// Only the last `limit` messages are sent to the model.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    pub async fn generate_reply(
        &self,
        history: &[message::Model],
        settings: &ChatSettings,
        quiz_requested: bool,
    ) -> GatewayReply {
        match self.request(history, settings, quiz_requested).await {
            Ok(envelope) => GatewayReply::from_envelope(envelope),
            Err(e) => {
                warn!("Falling back to the default reply: {}", e);
                GatewayReply::failure()
            }
        }
    }

    async fn request(
        &self,
        history: &[message::Model],
        settings: &ChatSettings,
        quiz_requested: bool,
    ) -> Result<ResponseEnvelope> {
        let prompt = system_prompt(settings, quiz_requested);
        let turns = self.history_turns(history);
        debug!(
            "Requesting reply over {} messages (quiz requested: {})",
            turns.len(),
            quiz_requested
        );

        let raw = self
            .model
            .chat(&prompt, &turns, &self.sampling)
            .await
            .map_err(|e| Error::upstream_unavailable(e.to_string()))?;

        parse_reply(&raw)
    }

    fn history_turns(&self, history: &[message::Model]) -> Vec<ChatTurn> {
        let skip = self
            .history_limit
            .map(|limit| history.len().saturating_sub(limit))
            .unwrap_or(0);

        // The window must open on a user turn.
        history[skip..]
            .iter()
            .skip_while(|m| skip > 0 && !m.from_user)
            .map(|m| {
                let role = if m.from_user {
                    Role::User
                } else {
                    Role::Assistant
                };
                ChatTurn::new(role, m.content.clone())
            })
            .collect()
    }
}

/// Removes every `<think>...</think>` segment. Unbalanced markers are an error.
pub fn strip_thinking(raw: &str) -> Result<String> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut rest = raw;

    loop {
        match (rest.find(THINK_OPEN), rest.find(THINK_CLOSE)) {
            (None, None) => {
                cleaned.push_str(rest);
                return Ok(cleaned);
            }
            (Some(open), Some(close)) if open < close => {
                cleaned.push_str(&rest[..open]);
                rest = &rest[close + THINK_CLOSE.len()..];
            }
            _ => {
                return Err(Error::upstream_unavailable(
                    "unbalanced thinking markers in model output",
                ))
            }
        }
    }
}

fn unwrap_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // Drop an info string such as `json` on the opening fence.
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}

/// Decodes raw model text into the typed envelope.
pub fn parse_reply(raw: &str) -> Result<ResponseEnvelope> {
    let cleaned = strip_thinking(raw)?;
    let body = unwrap_code_fence(cleaned.trim());
    if body.is_empty() {
        return Err(Error::upstream_unavailable("model output was empty"));
    }

    serde_json::from_str(body)
        .map_err(|e| Error::upstream_unavailable(format!("malformed response envelope: {}", e)))
}
