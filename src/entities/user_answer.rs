use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One submitted answer. Rows are append-only; a retry gets the next attempt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub message_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub attempt: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub question_number: i32,
    pub chosen_option: String,
    pub answered_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::answer_option::Entity",
        from = "(Column::MessageId, Column::QuestionNumber, Column::ChosenOption)",
        to = "(super::answer_option::Column::MessageId, super::answer_option::Column::QuestionNumber, super::answer_option::Column::Label)"
    )]
    AnswerOption,
}

impl Related<super::answer_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnswerOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
