use crate::ids::{ReplyId, ThreadId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reply")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: ReplyId,
    pub thread_id: ThreadId,
    pub user_id: UserId,
    /// NULL for top-level replies to the thread itself. When set, the parent
    /// must be a reply in the same thread (enforced by the forums service).
    pub parent_reply_id: Option<ReplyId>,
    pub content: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discussion_thread::Entity",
        from = "Column::ThreadId",
        to = "super::discussion_thread::Column::Id"
    )]
    Thread,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentReplyId",
        to = "Column::Id"
    )]
    Parent,
}

impl Related<super::discussion_thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thread.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
