//! Read side of quiz taking: ordered questions and options, per-question
//! attempt counters and append-only answers.

use std::collections::{HashMap, HashSet};

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use tracing::{debug, info};

use crate::entities::{answer_option, quiz, quiz_question, user_answer};
use crate::error::{Error, Result};
use crate::store;

/// Result of grading one attempt pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptScore {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

/// Grades `answers` against the correctness flags in `options`.
///
/// `total` counts the distinct questions that `options` covers, so pass every
/// option of the quiz to grade a whole attempt.
pub fn score_attempt(
    options: &[answer_option::Model],
    answers: &[user_answer::Model],
) -> AttemptScore {
    let correct_labels: HashMap<i32, &str> = options
        .iter()
        .filter(|o| o.is_answer)
        .map(|o| (o.question_number, o.label.as_str()))
        .collect();
    let total = options
        .iter()
        .map(|o| o.question_number)
        .collect::<HashSet<_>>()
        .len();

    let correct = answers
        .iter()
        .filter(|a| correct_labels.get(&a.question_number) == Some(&a.chosen_option.as_str()))
        .count();

    AttemptScore {
        correct,
        answered: answers.len(),
        total,
    }
}

/// Concurrent answers to one question can race for the same attempt number.
const ANSWER_INSERT_TRIES: usize = 3;

#[derive(Clone)]
pub struct QuizRuntime {
    db: DatabaseConnection,
}

impl QuizRuntime {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_quiz(&self, message_id: i32) -> Result<quiz::Model> {
        store::quizzes::get_quiz(&self.db, message_id).await
    }

    /// Every quiz minted in the chat, keyed by the AI message that carries it.
    pub async fn get_chat_quizzes(&self, chat_id: i32) -> Result<Vec<quiz::Model>> {
        store::chats::get_chat(&self.db, chat_id).await?;
        store::quizzes::list_chat_quizzes(&self.db, chat_id).await
    }

    pub async fn get_quiz_questions(&self, message_id: i32) -> Result<Vec<quiz_question::Model>> {
        store::quizzes::get_quiz(&self.db, message_id).await?;
        store::quizzes::list_questions(&self.db, message_id).await
    }

    pub async fn get_question_answer_options(
        &self,
        message_id: i32,
        number: i32,
    ) -> Result<Vec<answer_option::Model>> {
        self.get_question(message_id, number).await?;
        store::quizzes::list_options(&self.db, message_id, number).await
    }

    async fn get_question(&self, message_id: i32, number: i32) -> Result<quiz_question::Model> {
        store::quizzes::find_question(&self.db, message_id, number)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("question {} of quiz {}", number, message_id))
            })
    }

    /// The attempt number the next answer to this question will get.
    pub async fn calculate_current_attempt(&self, message_id: i32, number: i32) -> Result<i32> {
        let count = store::answers::count_answers(&self.db, message_id, number).await?;
        Ok(count as i32 + 1)
    }

    /// Records an answer as a new attempt. Earlier attempts are never touched.
    pub async fn create_user_answer(
        &self,
        message_id: i32,
        number: i32,
        chosen_label: &str,
    ) -> Result<user_answer::Model> {
        let chosen_label = chosen_label.trim();
        self.get_question(message_id, number).await?;
        if store::quizzes::find_option(&self.db, message_id, number, chosen_label)
            .await?
            .is_none()
        {
            return Err(Error::not_found(format!(
                "option \"{}\" for question {} of quiz {}",
                chosen_label, number, message_id
            )));
        }

        for _ in 0..ANSWER_INSERT_TRIES {
            match self.insert_next_attempt(message_id, number, chosen_label).await {
                Err(e) if e.is_already_exists() => {
                    debug!(
                        "Attempt number for question {} of quiz {} was taken; retrying",
                        number, message_id
                    );
                }
                Ok(answer) => {
                    info!(
                        "Recorded attempt {} for question {} of quiz {}",
                        answer.attempt, number, message_id
                    );
                    return Ok(answer);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::internal(format!(
            "could not allocate an attempt number for question {} of quiz {}",
            number, message_id
        )))
    }

    async fn insert_next_attempt(
        &self,
        message_id: i32,
        number: i32,
        chosen_label: &str,
    ) -> Result<user_answer::Model> {
        let txn = self.db.begin().await?;
        let attempt = store::answers::count_answers(&txn, message_id, number).await? as i32 + 1;
        let answer =
            store::answers::insert_answer(&txn, message_id, attempt, number, chosen_label).await?;
        txn.commit().await?;
        Ok(answer)
    }

    pub async fn get_quiz_user_answers(
        &self,
        message_id: i32,
        attempt: i32,
    ) -> Result<Vec<user_answer::Model>> {
        store::answers::list_attempt_answers(&self.db, message_id, attempt).await
    }

    pub async fn latest_attempt(&self, message_id: i32) -> Result<i32> {
        store::answers::max_attempt(&self.db, message_id).await
    }

    pub async fn grade_attempt(&self, message_id: i32, attempt: i32) -> Result<AttemptScore> {
        store::quizzes::get_quiz(&self.db, message_id).await?;
        let options = store::quizzes::list_quiz_options(&self.db, message_id).await?;
        let answers = self.get_quiz_user_answers(message_id, attempt).await?;
        Ok(score_attempt(&options, &answers))
    }
}
