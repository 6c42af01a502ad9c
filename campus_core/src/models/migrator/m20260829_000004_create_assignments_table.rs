use sea_orm_migration::{prelude::*, schema::*};

use super::big_pk_auto;

use super::m20260829_000002_create_courses_table::Course;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assignment::Table)
                    .col(big_pk_auto(Assignment::Id))
                    .col(big_integer(Assignment::CourseId))
                    .col(string(Assignment::Title))
                    .col(string(Assignment::DueDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignment-course_id")
                            .from(Assignment::Table, Assignment::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_course_id")
                    .table(Assignment::Table)
                    .col(Assignment::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assignment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Assignment {
    Table,
    Id,
    CourseId,
    Title,
    DueDate,
}
