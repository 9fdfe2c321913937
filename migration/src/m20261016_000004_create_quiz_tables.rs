use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // A quiz is keyed by the AI message that carried it.
        manager
            .create_table(
                Table::create()
                    .table(Quiz::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Quiz::MessageId)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Quiz::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Quiz::Difficulty).string_len(50).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_message_id")
                            .from(Quiz::Table, Quiz::MessageId)
                            .to(Message::Table, Message::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizQuestion::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QuizQuestion::MessageId).integer().not_null())
                    .col(ColumnDef::new(QuizQuestion::Number).integer().not_null())
                    .col(ColumnDef::new(QuizQuestion::QuestionText).text().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_quiz_question")
                            .col(QuizQuestion::MessageId)
                            .col(QuizQuestion::Number),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_question_message_id")
                            .from(QuizQuestion::Table, QuizQuestion::MessageId)
                            .to(Quiz::Table, Quiz::MessageId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AnswerOption::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AnswerOption::MessageId).integer().not_null())
                    .col(
                        ColumnDef::new(AnswerOption::QuestionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnswerOption::Option).string_len(10).not_null())
                    .col(ColumnDef::new(AnswerOption::Value).string_len(500).not_null())
                    .col(
                        ColumnDef::new(AnswerOption::IsAnswer)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_answer_option")
                            .col(AnswerOption::MessageId)
                            .col(AnswerOption::QuestionNumber)
                            .col(AnswerOption::Option),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_option_question")
                            .from(
                                AnswerOption::Table,
                                (AnswerOption::MessageId, AnswerOption::QuestionNumber),
                            )
                            .to(
                                QuizQuestion::Table,
                                (QuizQuestion::MessageId, QuizQuestion::Number),
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnswerOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizQuestion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quiz::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Quiz {
    Table,
    MessageId,
    Name,
    Difficulty,
}

#[derive(DeriveIden)]
enum QuizQuestion {
    Table,
    MessageId,
    Number,
    QuestionText,
}

#[derive(DeriveIden)]
enum AnswerOption {
    Table,
    MessageId,
    QuestionNumber,
    Option,
    Value,
    IsAnswer,
}

#[derive(DeriveIden)]
enum Message {
    Table,
    Id,
}
