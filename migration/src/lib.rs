pub use sea_orm_migration::prelude::*;

mod m20261016_000001_create_users_table;
mod m20261016_000002_create_chat_table;
mod m20261016_000003_create_message_table;
mod m20261016_000004_create_quiz_tables;
mod m20261016_000005_create_user_answer_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261016_000001_create_users_table::Migration),
            Box::new(m20261016_000002_create_chat_table::Migration),
            Box::new(m20261016_000003_create_message_table::Migration),
            Box::new(m20261016_000004_create_quiz_tables::Migration),
            Box::new(m20261016_000005_create_user_answer_table::Migration),
        ]
    }
}
