use sea_orm_migration::{prelude::*, schema::big_integer};

/// Create a big-integer primary key column with auto-increment feature.
pub(crate) fn big_pk_auto<T: IntoIden>(name: T) -> ColumnDef {
    big_integer(name).auto_increment().primary_key().take()
}

mod m20260829_000001_create_users_table;
mod m20260829_000002_create_courses_table;
mod m20260829_000003_create_enrollments_table;
mod m20260829_000004_create_assignments_table;
mod m20260829_000005_create_submissions_table;
mod m20260829_000006_create_forums_table;
mod m20260829_000007_create_discussion_threads_table;
mod m20260829_000008_create_replies_table;
mod m20260829_000009_create_sections_table;
mod m20260829_000010_create_section_items_table;
mod m20260829_000011_create_calendar_events_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_create_users_table::Migration),
            Box::new(m20260829_000002_create_courses_table::Migration),
            Box::new(m20260829_000003_create_enrollments_table::Migration),
            Box::new(m20260829_000004_create_assignments_table::Migration),
            Box::new(m20260829_000005_create_submissions_table::Migration),
            Box::new(m20260829_000006_create_forums_table::Migration),
            Box::new(m20260829_000007_create_discussion_threads_table::Migration),
            Box::new(m20260829_000008_create_replies_table::Migration),
            Box::new(m20260829_000009_create_sections_table::Migration),
            Box::new(m20260829_000010_create_section_items_table::Migration),
            Box::new(m20260829_000011_create_calendar_events_table::Migration),
        ]
    }
}

#[cfg(test)]
use sea_orm::{Database, DbErr};

#[tokio::test]
async fn test_migrations_okay() -> Result<(), DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let schema_manager = SchemaManager::new(&db);

    Migrator::refresh(&db).await?;

    assert!(schema_manager.has_table("user").await?);
    assert!(schema_manager.has_table("course").await?);
    assert!(schema_manager.has_table("enrollment").await?);
    assert!(schema_manager.has_table("assignment").await?);
    assert!(schema_manager.has_table("submission").await?);
    assert!(schema_manager.has_table("forum").await?);
    assert!(schema_manager.has_table("discussion_thread").await?);
    assert!(schema_manager.has_table("reply").await?);
    assert!(schema_manager.has_table("section").await?);
    assert!(schema_manager.has_table("section_item").await?);
    assert!(schema_manager.has_table("calendar_event").await?);

    Ok(())
}
