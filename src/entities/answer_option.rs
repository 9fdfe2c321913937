use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer_option")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub message_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub question_number: i32,
    #[sea_orm(primary_key, auto_increment = false, column_name = "option")]
    pub label: String,
    pub value: String,
    pub is_answer: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quiz_question::Entity",
        from = "(Column::MessageId, Column::QuestionNumber)",
        to = "(super::quiz_question::Column::MessageId, super::quiz_question::Column::Number)"
    )]
    QuizQuestion,
}

impl Related<super::quiz_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizQuestion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
