use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAnswer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserAnswer::MessageId).integer().not_null())
                    .col(ColumnDef::new(UserAnswer::Attempt).integer().not_null())
                    .col(ColumnDef::new(UserAnswer::QuestionNumber).integer().not_null())
                    .col(ColumnDef::new(UserAnswer::ChosenOption).string_len(10).not_null())
                    .col(
                        ColumnDef::new(UserAnswer::AnsweredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_user_answer")
                            .col(UserAnswer::MessageId)
                            .col(UserAnswer::Attempt)
                            .col(UserAnswer::QuestionNumber),
                    )
                    // The chosen label must be one that was actually offered.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_answer_option")
                            .from(
                                UserAnswer::Table,
                                (
                                    UserAnswer::MessageId,
                                    UserAnswer::QuestionNumber,
                                    UserAnswer::ChosenOption,
                                ),
                            )
                            .to(
                                AnswerOption::Table,
                                (
                                    AnswerOption::MessageId,
                                    AnswerOption::QuestionNumber,
                                    AnswerOption::Option,
                                ),
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_answer_question")
                    .table(UserAnswer::Table)
                    .col(UserAnswer::MessageId)
                    .col(UserAnswer::QuestionNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserAnswer::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserAnswer {
    Table,
    MessageId,
    Attempt,
    QuestionNumber,
    ChosenOption,
    AnsweredAt,
}

#[derive(DeriveIden)]
enum AnswerOption {
    Table,
    MessageId,
    QuestionNumber,
    Option,
}
