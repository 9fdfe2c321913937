use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};

use crate::entities::users::{self, Entity as User, Model};
use crate::error::{Error, Result};
use crate::validation::NewUser;

pub async fn insert_user<C: ConnectionTrait>(db: &C, user: &NewUser) -> Result<Model> {
    let new_user = users::ActiveModel {
        id: NotSet,
        username: Set(user.username().to_string()),
        password_hash: Set(user.password_hash().to_string()),
        created_at: Set(chrono::Utc::now()),
    };

    new_user
        .insert(db)
        .await
        .map_err(|e| Error::from_insert(e, &format!("user {}", user.username())))
}

pub async fn find_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<Model>> {
    Ok(User::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(db)
        .await?)
}

pub async fn get_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model> {
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(format!("user {}", id)))
}
