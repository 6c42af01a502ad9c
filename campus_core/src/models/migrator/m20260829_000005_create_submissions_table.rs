use sea_orm_migration::{prelude::*, schema::*};

use super::m20260829_000001_create_users_table::User;
use super::m20260829_000004_create_assignments_table::Assignment;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .col(big_integer(Submission::AssignmentId))
                    .col(big_integer(Submission::UserId))
                    .col(string(Submission::FileLink))
                    .col(string(Submission::SubmittedAt))
                    .col(double_null(Submission::Grade))
                    // One submission per student per assignment
                    .primary_key(
                        Index::create()
                            .col(Submission::AssignmentId)
                            .col(Submission::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-assignment_id")
                            .from(Submission::Table, Submission::AssignmentId)
                            .to(Assignment::Table, Assignment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-user_id")
                            .from(Submission::Table, Submission::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-student grade averages scan by user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_user_id")
                    .table(Submission::Table)
                    .col(Submission::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Submission {
    Table,
    AssignmentId,
    UserId,
    FileLink,
    SubmittedAt,
    Grade,
}
