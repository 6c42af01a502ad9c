use sea_orm_migration::{prelude::*, schema::*};

use super::big_pk_auto;

use super::m20260829_000001_create_users_table::User;
use super::m20260829_000006_create_forums_table::Forum;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiscussionThread::Table)
                    .col(big_pk_auto(DiscussionThread::Id))
                    .col(big_integer(DiscussionThread::ForumId))
                    .col(big_integer(DiscussionThread::UserId))
                    .col(string(DiscussionThread::Title))
                    .col(string(DiscussionThread::Content))
                    .col(string(DiscussionThread::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discussion-thread-forum_id")
                            .from(DiscussionThread::Table, DiscussionThread::ForumId)
                            .to(Forum::Table, Forum::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discussion-thread-user_id")
                            .from(DiscussionThread::Table, DiscussionThread::UserId)
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
                    .name("idx_discussion_threads_forum_id")
                    .table(DiscussionThread::Table)
                    .col(DiscussionThread::ForumId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscussionThread::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DiscussionThread {
    Table,
    Id,
    ForumId,
    UserId,
    Title,
    Content,
    CreatedAt,
}
