use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::user_answer::{self, Entity as UserAnswer, Model};
use crate::error::{Error, Result};

/// Number of answers already recorded for one question of a quiz.
pub async fn count_answers<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    question_number: i32,
) -> Result<u64> {
    Ok(UserAnswer::find()
        .filter(user_answer::Column::MessageId.eq(message_id))
        .filter(user_answer::Column::QuestionNumber.eq(question_number))
        .count(db)
        .await?)
}

pub async fn insert_answer<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    attempt: i32,
    question_number: i32,
    chosen_option: &str,
) -> Result<Model> {
    let new_answer = user_answer::ActiveModel {
        message_id: Set(message_id),
        attempt: Set(attempt),
        question_number: Set(question_number),
        chosen_option: Set(chosen_option.to_string()),
        answered_at: Set(chrono::Utc::now()),
    };

    new_answer.insert(db).await.map_err(|e| {
        Error::from_insert(
            e,
            &format!(
                "attempt {} for question {} of quiz {}",
                attempt, question_number, message_id
            ),
        )
    })
}

/// Answers given during one attempt pass, ordered by question number.
pub async fn list_attempt_answers<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    attempt: i32,
) -> Result<Vec<Model>> {
    Ok(UserAnswer::find()
        .filter(user_answer::Column::MessageId.eq(message_id))
        .filter(user_answer::Column::Attempt.eq(attempt))
        .order_by_asc(user_answer::Column::QuestionNumber)
        .all(db)
        .await?)
}

/// Highest attempt number recorded for any question of the quiz, or 0.
pub async fn max_attempt<C: ConnectionTrait>(db: &C, message_id: i32) -> Result<i32> {
    Ok(UserAnswer::find()
        .filter(user_answer::Column::MessageId.eq(message_id))
        .order_by_desc(user_answer::Column::Attempt)
        .one(db)
        .await?
        .map(|answer| answer.attempt)
        .unwrap_or(0))
}
