use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::message::{self, Entity as Message, Model};
use crate::error::{Error, Result};
use crate::validation::NewMessage;

pub async fn insert_message<C: ConnectionTrait>(db: &C, new: &NewMessage) -> Result<Model> {
    let new_message = message::ActiveModel {
        id: NotSet,
        chat_id: Set(new.chat_id()),
        content: Set(new.content().to_string()),
        from_user: Set(new.from_user()),
        is_quiz: Set(new.is_quiz()),
        created_at: Set(chrono::Utc::now()),
    };

    Ok(new_message.insert(db).await?)
}

pub async fn find_message<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Model>> {
    Ok(Message::find_by_id(id).one(db).await?)
}

pub async fn get_message<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model> {
    find_message(db, id)
        .await?
        .ok_or_else(|| Error::not_found(format!("message {}", id)))
}

/// Full history of a chat in creation order.
pub async fn list_chat_messages<C: ConnectionTrait>(db: &C, chat_id: i32) -> Result<Vec<Model>> {
    Ok(Message::find()
        .filter(message::Column::ChatId.eq(chat_id))
        .order_by_asc(message::Column::Id)
        .all(db)
        .await?)
}

/// History up to and including `last_id`.
pub async fn list_chat_messages_until<C: ConnectionTrait>(
    db: &C,
    chat_id: i32,
    last_id: i32,
) -> Result<Vec<Model>> {
    Ok(Message::find()
        .filter(message::Column::ChatId.eq(chat_id))
        .filter(message::Column::Id.lte(last_id))
        .order_by_asc(message::Column::Id)
        .all(db)
        .await?)
}

pub async fn delete_message<C: ConnectionTrait>(db: &C, id: i32) -> Result<()> {
    let result = Message::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found(format!("message {}", id)));
    }
    Ok(())
}
