//! The tutoring session state machine.
//!
//! A [`Tutor`] owns the database handle and the gateway. It turns user
//! messages into persisted exchanges and mints quizzes from AI replies.
//! Reply generation is serialized per chat: at most one exchange is in flight
//! for a chat at any time.

pub mod decompose;
pub mod runtime;
pub mod setup;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::entities::{chat, message, quiz};
use crate::error::{Error, Result};
use crate::services::gateway::{Gateway, GatewayReply};
use crate::store;
use crate::validation::{validate_quiz_payload, ChatSettings, NewMessage, NewQuiz};

pub use runtime::{score_attempt, AttemptScore, QuizRuntime};
pub use setup::{ChatForm, ChatSetup, SetupMode};

/// Outcome of one reply generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorReply {
    /// The AI message holding the reply text (the fallback text on error).
    pub reply: message::Model,
    /// Extra quiz-bearing AI messages when the model sent more than one quiz.
    pub follow_up_messages: Vec<message::Model>,
    pub quizzes: Vec<quiz::Model>,
    pub is_error: bool,
}

/// A user message together with the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user_message: message::Model,
    pub reply: TutorReply,
}

#[derive(Default)]
struct ChatLocks {
    locks: Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>,
}

impl ChatLocks {
    fn get(&self, chat_id: i32) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks.entry(chat_id).or_default().clone()
    }

    fn forget(&self, chat_id: i32) {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks.remove(&chat_id);
    }
}

#[derive(Clone)]
pub struct Tutor {
    db: DatabaseConnection,
    gateway: Arc<Gateway>,
    chat_locks: Arc<ChatLocks>,
}

impl Tutor {
    pub fn new(db: DatabaseConnection, gateway: Gateway) -> Self {
        Self {
            db,
            gateway: Arc::new(gateway),
            chat_locks: Arc::new(ChatLocks::default()),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn runtime(&self) -> QuizRuntime {
        QuizRuntime::new(self.db.clone())
    }

    async fn lock_chat(&self, chat_id: i32) -> OwnedMutexGuard<()> {
        self.chat_locks.get(chat_id).lock_owned().await
    }

    pub async fn setup_chat(&self, setup: ChatSetup) -> Result<chat::Model> {
        setup.apply(&self.db).await
    }

    pub async fn get_chat(&self, chat_id: i32) -> Result<chat::Model> {
        store::chats::get_chat(&self.db, chat_id).await
    }

    pub async fn list_chats(&self, user_id: i32) -> Result<Vec<chat::Model>> {
        store::chats::list_chats(&self.db, user_id).await
    }

    /// Deletes a chat with all of its messages, quizzes and answers.
    pub async fn delete_chat(&self, chat_id: i32) -> Result<()> {
        let guard = self.lock_chat(chat_id).await;
        store::chats::delete_chat(&self.db, chat_id).await?;
        drop(guard);
        self.chat_locks.forget(chat_id);
        info!("Deleted chat {}", chat_id);
        Ok(())
    }

    pub async fn get_chat_messages(&self, chat_id: i32) -> Result<Vec<message::Model>> {
        store::chats::get_chat(&self.db, chat_id).await?;
        store::messages::list_chat_messages(&self.db, chat_id).await
    }

    pub async fn get_message(&self, message_id: i32) -> Result<message::Model> {
        store::messages::get_message(&self.db, message_id).await
    }

    pub async fn create_message(
        &self,
        chat_id: i32,
        content: &str,
        from_user: bool,
        is_quiz: bool,
    ) -> Result<message::Model> {
        let new_message = NewMessage::new(chat_id, content, from_user, is_quiz)?;
        let _guard = self.lock_chat(chat_id).await;
        self.insert_message(&new_message).await
    }

    async fn insert_message(&self, new_message: &NewMessage) -> Result<message::Model> {
        store::chats::get_chat(&self.db, new_message.chat_id()).await?;
        store::messages::insert_message(&self.db, new_message).await
    }

    /// Generates and persists the AI reply to a user message.
    pub async fn generate_reply(&self, user_message: &message::Model) -> Result<TutorReply> {
        if !user_message.from_user {
            return Err(Error::invalid_argument(format!(
                "message {} was written by the tutor and cannot be replied to",
                user_message.id
            )));
        }
        let guard = self.lock_chat(user_message.chat_id).await;
        self.reply_locked(guard, user_message.chat_id, user_message.id)
            .await
    }

    /// Records a user message and replies to it as one serialized exchange.
    pub async fn send_message(
        &self,
        chat_id: i32,
        content: &str,
        quiz_requested: bool,
    ) -> Result<Exchange> {
        let new_message = NewMessage::new(chat_id, content, true, quiz_requested)?;
        let guard = self.lock_chat(chat_id).await;
        let user_message = self.insert_message(&new_message).await?;
        let reply = self
            .reply_locked(guard, user_message.chat_id, user_message.id)
            .await?;
        Ok(Exchange {
            user_message,
            reply,
        })
    }

    /// Replies to `message_id` while holding the lock of `locked_chat_id`.
    ///
    /// Only the stored row is trusted from here on.
    async fn reply_locked(
        &self,
        guard: OwnedMutexGuard<()>,
        locked_chat_id: i32,
        message_id: i32,
    ) -> Result<TutorReply> {
        let user_message = store::messages::get_message(&self.db, message_id).await?;
        if !user_message.from_user {
            return Err(Error::invalid_argument(format!(
                "message {} was written by the tutor and cannot be replied to",
                user_message.id
            )));
        }
        if user_message.chat_id != locked_chat_id {
            return Err(Error::invalid_argument(format!(
                "message {} belongs to chat {}, not chat {}",
                user_message.id, user_message.chat_id, locked_chat_id
            )));
        }

        let chat = store::chats::get_chat(&self.db, user_message.chat_id).await?;
        let settings = ChatSettings::from_chat(&chat)?;
        let history =
            store::messages::list_chat_messages_until(&self.db, chat.id, user_message.id).await?;

        let quiz_requested = user_message.is_quiz;
        let mut reply = self
            .gateway
            .generate_reply(&history, &settings, quiz_requested)
            .await;

        if !reply.is_error && reply.wants_quiz && reply.quizzes.is_empty() && !quiz_requested {
            info!("Tutor offered a quiz in chat {}; requesting one", chat.id);
            let follow_up = self.gateway.generate_reply(&history, &settings, true).await;
            if follow_up.is_error {
                warn!("Follow-up quiz request failed for chat {}", chat.id);
            } else {
                reply.quizzes = follow_up.quizzes;
            }
        }

        let quizzes = valid_quizzes(&reply, chat.id);

        // From here on the write runs to completion even if the caller goes away.
        let db = self.db.clone();
        let chat_id = chat.id;
        let persist = tokio::spawn(async move {
            let _guard = guard;
            persist_reply(&db, chat_id, reply, quizzes).await
        });

        persist.await.map_err(|e| {
            Error::Database(DbErr::Custom(format!("reply persistence task failed: {}", e)))
        })?
    }
}

fn valid_quizzes(reply: &GatewayReply, chat_id: i32) -> Vec<NewQuiz> {
    if reply.is_error {
        return Vec::new();
    }
    reply
        .quizzes
        .iter()
        .filter_map(|payload| match validate_quiz_payload(payload) {
            Ok(quiz) => Some(quiz),
            Err(e) => {
                warn!("Discarding malformed quiz in chat {}: {}", chat_id, e);
                None
            }
        })
        .collect()
}

/// Writes the reply message and any quiz trees as one transaction.
async fn persist_reply(
    db: &DatabaseConnection,
    chat_id: i32,
    reply: GatewayReply,
    quizzes: Vec<NewQuiz>,
) -> Result<TutorReply> {
    let txn = db.begin().await?;

    let reply_message = NewMessage::new(chat_id, &reply.reply_text, false, !quizzes.is_empty())?;
    let reply_model = store::messages::insert_message(&txn, &reply_message).await?;

    let mut follow_up_messages = Vec::new();
    let mut created = Vec::with_capacity(quizzes.len());
    for (index, new_quiz) in quizzes.iter().enumerate() {
        let owner_id = if index == 0 {
            reply_model.id
        } else {
            let extra = NewMessage::new(chat_id, &format!("Quiz: {}", new_quiz.name()), false, true)?;
            let extra = store::messages::insert_message(&txn, &extra).await?;
            let id = extra.id;
            follow_up_messages.push(extra);
            id
        };
        created.push(store::quizzes::insert_quiz_tree(&txn, owner_id, new_quiz).await?);
    }

    txn.commit().await?;

    info!(
        "Stored reply {} in chat {} ({} quizzes, error: {})",
        reply_model.id,
        chat_id,
        created.len(),
        reply.is_error
    );

    Ok(TutorReply {
        reply: reply_model,
        follow_up_messages,
        quizzes: created,
        is_error: reply.is_error,
    })
}
