#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde_json::json;
use tokio::sync::Notify;

use study_tutor::accounts::{self, Argon2Hasher};
use study_tutor::db::connect_in_memory;
use study_tutor::entities::{chat, message, users};
use study_tutor::services::envelope::{OptionPayload, QuestionPayload, QuizPayload};
use study_tutor::services::gateway::Gateway;
use study_tutor::services::llm::{ChatTurn, LanguageModel, LlmError, SamplingConfig};
use study_tutor::tutor::{ChatForm, ChatSetup};
use study_tutor::Tutor;

/// One recorded call to the scripted model.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub history: Vec<ChatTurn>,
}

/// A language model that answers from a queue of canned replies.
///
/// An exhausted queue behaves like an unreachable model.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
    answered: Option<Arc<Notify>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Notified each time the model is about to hand back a reply.
    pub fn with_signal(mut self, answered: Arc<Notify>) -> Self {
        self.answered = Some(answered);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        _sampling: &SamplingConfig,
    ) -> Result<String, LlmError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            history: history.to_vec(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.replies.lock().unwrap().pop_front();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(answered) = &self.answered {
            answered.notify_one();
        }
        reply.ok_or(LlmError::EmptyResponse)
    }
}

pub struct TestContext {
    pub tutor: Tutor,
    pub model: Arc<ScriptedModel>,
    pub user: users::Model,
    pub chat: chat::Model,
}

impl TestContext {
    pub fn db(&self) -> &DatabaseConnection {
        self.tutor.db()
    }
}

pub async fn setup(model: ScriptedModel) -> TestContext {
    let db = connect_in_memory().await.expect("in-memory database");
    let model = Arc::new(model);
    let gateway = Gateway::new(model.clone(), SamplingConfig::default());
    let tutor = Tutor::new(db, gateway);

    let user = accounts::register(tutor.db(), &Argon2Hasher::default(), "ada", "lovelace-1815")
        .await
        .expect("register user");
    let chat = tutor
        .setup_chat(ChatSetup::create(
            user.id,
            ChatForm {
                name: Some("Chemistry".to_string()),
                quiz_length: Some(2),
                ..Default::default()
            },
        ))
        .await
        .expect("create chat");

    TestContext {
        tutor,
        model,
        user,
        chat,
    }
}

pub fn reply_json(response: &str) -> String {
    json!({ "wantsQuiz": false, "response": response, "isError": false, "quizzes": [] })
        .to_string()
}

pub fn quiz_reply_json(response: &str, quizzes: &[QuizPayload]) -> String {
    json!({ "wantsQuiz": true, "response": response, "isError": false, "quizzes": quizzes })
        .to_string()
}

/// Two questions: the electron is "B", the proton is "A".
pub fn atoms_quiz(name: &str) -> QuizPayload {
    QuizPayload::new(
        name,
        "Easy",
        vec![
            QuestionPayload::new(
                "What is the charge of an electron?",
                vec![
                    OptionPayload::new("A", "Positive", false),
                    OptionPayload::new("B", "Negative", true),
                    OptionPayload::new("C", "Neutral", false),
                ],
            ),
            QuestionPayload::new(
                "What is the charge of a proton?",
                vec![
                    OptionPayload::new("A", "Positive", true),
                    OptionPayload::new("B", "Negative", false),
                ],
            ),
        ],
    )
}

/// A quiz-bearing tutor message with no quiz attached yet.
pub async fn quiz_message(ctx: &TestContext) -> message::Model {
    ctx.tutor
        .create_message(ctx.chat.id, "Here is a quiz", false, true)
        .await
        .expect("create quiz message")
}
