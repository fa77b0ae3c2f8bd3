use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TypingResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TypingResults::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TypingResults::UserId).string().not_null())
                    .col(ColumnDef::new(TypingResults::Language).string().not_null())
                    .col(ColumnDef::new(TypingResults::Wpm).big_integer().not_null())
                    .col(ColumnDef::new(TypingResults::Accuracy).integer().not_null())
                    .col(
                        ColumnDef::new(TypingResults::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_typing_results_user_id")
                    .table(TypingResults::Table)
                    .col(TypingResults::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TypingResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TypingResults {
    Table,
    Id,
    UserId,
    Language,
    Wpm,
    Accuracy,
    Timestamp,
}
