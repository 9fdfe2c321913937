use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chat::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Chat::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Chat::UserId).integer().not_null())
                    .col(ColumnDef::new(Chat::Name).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Chat::ResponseAttitude)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Chat::QuizDifficulty).string_len(50).not_null())
                    .col(ColumnDef::new(Chat::QuizLength).integer().not_null())
                    .col(ColumnDef::new(Chat::EducationLevel).string_len(50).null())
                    .col(ColumnDef::new(Chat::StudyArea).string_len(100).null())
                    .col(
                        ColumnDef::new(Chat::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_user_id")
                            .from(Chat::Table, Chat::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_user_id")
                    .table(Chat::Table)
                    .col(Chat::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chat::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Chat {
    Table,
    Id,
    UserId,
    Name,
    ResponseAttitude,
    QuizDifficulty,
    QuizLength,
    EducationLevel,
    StudyArea,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
