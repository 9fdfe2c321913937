use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use sea_orm::JoinType;

use crate::entities::answer_option::{self, Entity as AnswerOption};
use crate::entities::message;
use crate::entities::quiz::{self, Entity as Quiz};
use crate::entities::quiz_question::{self, Entity as QuizQuestion};
use crate::error::{Error, Result};
use crate::validation::NewQuiz;

/// Writes a quiz and its whole question/option tree under `message_id`.
///
/// Callers run this inside a transaction; a failure part-way leaves rows that
/// must be rolled back with it. Questions are numbered from 1 in payload order.
pub async fn insert_quiz_tree<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    new_quiz: &NewQuiz,
) -> Result<quiz::Model> {
    let quiz = quiz::ActiveModel {
        message_id: Set(message_id),
        name: Set(new_quiz.name().to_string()),
        difficulty: Set(new_quiz.difficulty().to_string()),
    }
    .insert(db)
    .await
    .map_err(|e| Error::from_insert(e, &format!("quiz for message {}", message_id)))?;

    for (number, question) in (1..).zip(new_quiz.questions()) {
        quiz_question::ActiveModel {
            message_id: Set(message_id),
            number: Set(number),
            question_text: Set(question.text().to_string()),
        }
        .insert(db)
        .await?;

        for option in question.options() {
            answer_option::ActiveModel {
                message_id: Set(message_id),
                question_number: Set(number),
                label: Set(option.label().to_string()),
                value: Set(option.value().to_string()),
                is_answer: Set(option.is_answer()),
            }
            .insert(db)
            .await?;
        }
    }

    Ok(quiz)
}

pub async fn find_quiz<C: ConnectionTrait>(db: &C, message_id: i32) -> Result<Option<quiz::Model>> {
    Ok(Quiz::find_by_id(message_id).one(db).await?)
}

pub async fn get_quiz<C: ConnectionTrait>(db: &C, message_id: i32) -> Result<quiz::Model> {
    find_quiz(db, message_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("quiz for message {}", message_id)))
}

/// Quizzes carried by any message of the chat, oldest first.
pub async fn list_chat_quizzes<C: ConnectionTrait>(
    db: &C,
    chat_id: i32,
) -> Result<Vec<quiz::Model>> {
    Ok(Quiz::find()
        .join(JoinType::InnerJoin, quiz::Relation::Message.def())
        .filter(message::Column::ChatId.eq(chat_id))
        .order_by_asc(quiz::Column::MessageId)
        .all(db)
        .await?)
}

pub async fn list_questions<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
) -> Result<Vec<quiz_question::Model>> {
    Ok(QuizQuestion::find()
        .filter(quiz_question::Column::MessageId.eq(message_id))
        .order_by_asc(quiz_question::Column::Number)
        .all(db)
        .await?)
}

pub async fn find_question<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    number: i32,
) -> Result<Option<quiz_question::Model>> {
    Ok(QuizQuestion::find_by_id((message_id, number)).one(db).await?)
}

pub async fn count_questions<C: ConnectionTrait>(db: &C, message_id: i32) -> Result<u64> {
    Ok(QuizQuestion::find()
        .filter(quiz_question::Column::MessageId.eq(message_id))
        .count(db)
        .await?)
}

/// Options of one question, ordered by label.
pub async fn list_options<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    number: i32,
) -> Result<Vec<answer_option::Model>> {
    Ok(AnswerOption::find()
        .filter(answer_option::Column::MessageId.eq(message_id))
        .filter(answer_option::Column::QuestionNumber.eq(number))
        .order_by_asc(answer_option::Column::Label)
        .all(db)
        .await?)
}

/// Every option of every question in the quiz.
pub async fn list_quiz_options<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
) -> Result<Vec<answer_option::Model>> {
    Ok(AnswerOption::find()
        .filter(answer_option::Column::MessageId.eq(message_id))
        .order_by_asc(answer_option::Column::QuestionNumber)
        .order_by_asc(answer_option::Column::Label)
        .all(db)
        .await?)
}

pub async fn find_option<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    number: i32,
    label: &str,
) -> Result<Option<answer_option::Model>> {
    Ok(AnswerOption::find_by_id((message_id, number, label.to_string()))
        .one(db)
        .await?)
}
