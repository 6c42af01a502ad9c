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
                    .table(CalendarEvent::Table)
                    .col(big_pk_auto(CalendarEvent::Id))
                    .col(big_integer(CalendarEvent::CourseId))
                    .col(string(CalendarEvent::Title))
                    .col(string(CalendarEvent::EventDate))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-calendar-event-course_id")
                            .from(CalendarEvent::Table, CalendarEvent::CourseId)
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
                    .name("idx_calendar_events_course_id")
                    .table(CalendarEvent::Table)
                    .col(CalendarEvent::CourseId)
                    .to_owned(),
            )
            .await?;

        // Student day-view filters on the date column
        manager
            .create_index(
                Index::create()
                    .name("idx_calendar_events_event_date")
                    .table(CalendarEvent::Table)
                    .col(CalendarEvent::EventDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CalendarEvent::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CalendarEvent {
    Table,
    Id,
    CourseId,
    Title,
    EventDate,
}
