//! Typed shape of the JSON envelope the tutor model is instructed to answer with.
//!
//! Only `response` is mandatory at the top level. Quiz fields default to
//! empty so that a half-formed quiz reaches [`crate::validation`] and is
//! rejected there with a precise reason instead of failing the whole reply.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub wants_quiz: bool,
    pub response: String,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub quizzes: Vec<QuizPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub questions: Vec<QuestionPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<OptionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub is_answer: bool,
}

impl OptionPayload {
    pub fn new(label: &str, value: &str, is_answer: bool) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
            is_answer,
        }
    }
}

impl QuestionPayload {
    pub fn new(text: &str, options: Vec<OptionPayload>) -> Self {
        Self {
            text: text.to_string(),
            options,
            correct_label: None,
        }
    }

    /// Marks the option named by `correctLabel` when the model left every
    /// `isAnswer` flag unset. Questions that already flag an option are untouched.
    pub fn apply_correct_label(&mut self) {
        if self.options.iter().any(|o| o.is_answer) {
            return;
        }
        let Some(label) = self.correct_label.as_deref().map(str::trim) else {
            return;
        };
        if let Some(option) = self.options.iter_mut().find(|o| o.label.trim() == label) {
            option.is_answer = true;
        }
    }
}

impl QuizPayload {
    pub fn new(name: &str, difficulty: &str, questions: Vec<QuestionPayload>) -> Self {
        Self {
            name: name.to_string(),
            difficulty: difficulty.to_string(),
            questions,
        }
    }

    pub fn normalize(&mut self) {
        for question in &mut self.questions {
            question.apply_correct_label();
        }
    }
}
