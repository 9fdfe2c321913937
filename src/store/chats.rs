use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::chat::{self, Entity as Chat, Model};
use crate::error::{Error, Result};
use crate::validation::ChatSettings;

pub async fn insert_chat<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    settings: &ChatSettings,
) -> Result<Model> {
    let new_chat = chat::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        name: Set(settings.name().to_string()),
        response_attitude: Set(settings.response_attitude().to_string()),
        quiz_difficulty: Set(settings.quiz_difficulty().to_string()),
        quiz_length: Set(settings.quiz_length()),
        education_level: Set(settings.education_level().map(str::to_string)),
        study_area: Set(settings.study_area().map(str::to_string)),
        created_at: Set(chrono::Utc::now()),
    };

    Ok(new_chat.insert(db).await?)
}

pub async fn find_chat<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Model>> {
    Ok(Chat::find_by_id(id).one(db).await?)
}

pub async fn get_chat<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model> {
    find_chat(db, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("chat {}", id)))
}

/// Chats owned by `user_id`, newest first.
pub async fn list_chats<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<Model>> {
    Ok(Chat::find()
        .filter(chat::Column::UserId.eq(user_id))
        .order_by_desc(chat::Column::Id)
        .all(db)
        .await?)
}

pub async fn update_chat<C: ConnectionTrait>(
    db: &C,
    existing: Model,
    settings: &ChatSettings,
) -> Result<Model> {
    let mut active_chat: chat::ActiveModel = existing.into();
    active_chat.name = Set(settings.name().to_string());
    active_chat.response_attitude = Set(settings.response_attitude().to_string());
    active_chat.quiz_difficulty = Set(settings.quiz_difficulty().to_string());
    active_chat.quiz_length = Set(settings.quiz_length());
    active_chat.education_level = Set(settings.education_level().map(str::to_string));
    active_chat.study_area = Set(settings.study_area().map(str::to_string));

    Ok(active_chat.update(db).await?)
}

/// Deletes the chat; the schema cascades to every message, quiz and answer below it.
pub async fn delete_chat<C: ConnectionTrait>(db: &C, id: i32) -> Result<()> {
    let result = Chat::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(format!("chat {}", id)));
    }
    Ok(())
}
