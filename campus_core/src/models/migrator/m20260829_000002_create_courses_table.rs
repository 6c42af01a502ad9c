use sea_orm_migration::{prelude::*, schema::*};

use super::m20260829_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .col(
                        ColumnDef::new(Course::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string(Course::Title))
                    .col(string(Course::Description))
                    .col(big_integer(Course::LecturerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-course-lecturer_id")
                            .from(Course::Table, Course::LecturerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_lecturer_id")
                    .table(Course::Table)
                    .col(Course::LecturerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Course {
    Table,
    Id,
    Title,
    Description,
    LecturerId,
}
