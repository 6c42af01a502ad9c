use sea_orm_migration::{prelude::*, schema::*};

use super::big_pk_auto;

use super::m20260829_000001_create_users_table::User;
use super::m20260829_000007_create_discussion_threads_table::DiscussionThread;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reply::Table)
                    .col(big_pk_auto(Reply::Id))
                    .col(big_integer(Reply::ThreadId))
                    .col(big_integer(Reply::UserId))
                    .col(big_integer_null(Reply::ParentReplyId)) // NULL = top-level reply
                    .col(string(Reply::Content))
                    .col(string(Reply::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-thread_id")
                            .from(Reply::Table, Reply::ThreadId)
                            .to(DiscussionThread::Table, DiscussionThread::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-user_id")
                            .from(Reply::Table, Reply::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-parent_id")
                            .from(Reply::Table, Reply::ParentReplyId)
                            .to(Reply::Table, Reply::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The tree builder pulls a whole thread's replies in one query
        manager
            .create_index(
                Index::create()
                    .name("idx_replies_thread_id")
                    .table(Reply::Table)
                    .col(Reply::ThreadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replies_parent_reply_id")
                    .table(Reply::Table)
                    .col(Reply::ParentReplyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_replies_created_at")
                    .table(Reply::Table)
                    .col(Reply::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reply::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reply {
    Table,
    Id,
    ThreadId,
    UserId,
    ParentReplyId,
    Content,
    CreatedAt,
}
