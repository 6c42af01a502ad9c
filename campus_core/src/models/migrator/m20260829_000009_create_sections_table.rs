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
                    .table(Section::Table)
                    .col(big_pk_auto(Section::Id))
                    .col(big_integer(Section::CourseId))
                    .col(string(Section::Title))
                    .col(string(Section::SectionType))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-section-course_id")
                            .from(Section::Table, Section::CourseId)
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
                    .name("idx_sections_course_id")
                    .table(Section::Table)
                    .col(Section::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Section::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Section {
    Table,
    Id,
    CourseId,
    Title,
    SectionType,
}
