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
                    .table(Forum::Table)
                    .col(big_pk_auto(Forum::Id))
                    .col(big_integer(Forum::CourseId))
                    .col(string(Forum::Title))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-forum-course_id")
                            .from(Forum::Table, Forum::CourseId)
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
                    .name("idx_forums_course_id")
                    .table(Forum::Table)
                    .col(Forum::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Forum::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Forum {
    Table,
    Id,
    CourseId,
    Title,
}
