use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    // Caller-assigned registry numbers, no auto increment
                    .col(
                        ColumnDef::new(User::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(User::Name))
                    .col(string_len(User::AccountType, 16))
                    .col(string_uniq(User::Email))
                    .col(string(User::PasswordSalt))
                    .col(string(User::PasswordHash))
                    .col(string(User::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Login looks users up by email
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    Name,
    AccountType,
    Email,
    PasswordSalt,
    PasswordHash,
    CreatedAt,
}
