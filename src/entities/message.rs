use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_name = "chat_id")]
    pub chat_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub from_user: bool,
    pub is_quiz: bool,
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Only AI-authored, quiz-flagged messages may own a quiz.
    pub fn can_own_quiz(&self) -> bool {
        !self.from_user && self.is_quiz
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chat::Entity",
        from = "Column::ChatId",
        to = "super::chat::Column::Id"
    )]
    Chat,
    #[sea_orm(has_one = "super::quiz::Entity")]
    Quiz,
}

impl Related<super::chat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chat.def()
    }
}

impl Related<super::quiz::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
