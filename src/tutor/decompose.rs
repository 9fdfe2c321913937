//! Turning a quiz payload into quiz, question and answer-option rows.

use sea_orm::TransactionTrait;
use tracing::info;

use crate::entities::{message, quiz};
use crate::error::{Error, Result};
use crate::services::envelope::QuizPayload;
use crate::store;
use crate::validation::validate_quiz_payload;

use super::Tutor;

impl Tutor {
    /// Decomposes `payload` into a quiz owned by `owner`.
    ///
    /// All-or-nothing: a malformed payload writes no rows, and a message that
    /// already owns a quiz is rejected with `AlreadyExists`.
    pub async fn create_quiz(
        &self,
        payload: &QuizPayload,
        owner: &message::Model,
    ) -> Result<quiz::Model> {
        if !owner.can_own_quiz() {
            return Err(Error::invalid_argument(format!(
                "message {} is not a quiz-bearing tutor message",
                owner.id
            )));
        }

        let _guard = self.lock_chat(owner.chat_id).await;

        // Trust the stored row over the caller's copy.
        let stored = store::messages::get_message(self.db(), owner.id).await?;
        if !stored.can_own_quiz() {
            return Err(Error::invalid_argument(format!(
                "message {} is not a quiz-bearing tutor message",
                stored.id
            )));
        }
        if store::quizzes::find_quiz(self.db(), stored.id).await?.is_some() {
            return Err(Error::already_exists(format!(
                "quiz for message {}",
                stored.id
            )));
        }

        let new_quiz = validate_quiz_payload(payload)?;

        let txn = self.db().begin().await?;
        let created = store::quizzes::insert_quiz_tree(&txn, stored.id, &new_quiz).await?;
        txn.commit().await?;

        info!(
            "Created quiz \"{}\" with {} questions for message {}",
            created.name,
            new_quiz.questions().len(),
            created.message_id
        );
        Ok(created)
    }
}
