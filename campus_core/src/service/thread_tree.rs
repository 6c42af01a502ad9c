use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{ReplyId, ThreadId},
};

/// Replies nested deeper than this fail the whole traversal. Real
/// conversations sit in the single digits; anything near the limit is
/// corrupt data, not discussion.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Error)]
pub enum ThreadTreeError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("thread not found")]
    ThreadNotFound,

    #[error("reply nesting exceeds {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("{count} replies unreachable from the thread roots (cyclic or foreign parentage)")]
    UnreachableReplies { count: usize },
}

impl From<ThreadTreeError> for ServiceError {
    fn from(error: ThreadTreeError) -> Self {
        match error {
            ThreadTreeError::DbError(error) => ServiceError::infra(error),
            ThreadTreeError::ThreadNotFound => ServiceError::not_found(error),
            ThreadTreeError::DepthExceeded { .. } => ServiceError::integrity(error),
            ThreadTreeError::UnreachableReplies { .. } => ServiceError::integrity(error),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadView {
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyNode {
    pub id: ReplyId,
    pub content: String,
    pub replies: Vec<ReplyNode>,
}

/// A thread plus its fully materialized reply forest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadTree {
    pub thread: ThreadView,
    pub replies: Vec<ReplyNode>,
}

impl ThreadTree {
    /// Total number of reply nodes in the forest. Always equals the number
    /// of reply rows of the thread; the builder refuses to return anything
    /// less.
    pub fn node_count(&self) -> usize {
        fn walk(nodes: &[ReplyNode]) -> usize {
            nodes.iter().map(|n| 1 + walk(&n.replies)).sum()
        }
        walk(&self.replies)
    }
}

/// Materializes a thread's reply forest from the store.
///
/// All replies of the thread are fetched in a single query and grouped by
/// parent in memory, so the traversal never issues per-node reads and a
/// cyclic parent chain cannot make it loop: each parent's bucket is taken
/// exactly once, and whatever the walk from the roots cannot reach is
/// reported as an integrity failure instead of being silently dropped.
pub struct ThreadTreeBuilder<'a> {
    db: &'a DatabaseConnection,
    max_depth: usize,
}

impl<'a> ThreadTreeBuilder<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub async fn build(&self, thread_id: ThreadId) -> Result<ThreadTree, ThreadTreeError> {
        let thread = DiscussionThread::find_by_id(thread_id)
            .one(self.db)
            .await?
            .ok_or(ThreadTreeError::ThreadNotFound)?;

        // Whole forest in one pass; sibling order is creation order, with
        // the id as tie-breaker for same-timestamp rows.
        let rows = Reply::find()
            .filter(ReplyColumn::ThreadId.eq(thread_id))
            .order_by_asc(ReplyColumn::CreatedAt)
            .order_by_asc(ReplyColumn::Id)
            .all(self.db)
            .await?;

        let total = rows.len();
        let mut buckets: HashMap<Option<ReplyId>, Vec<ReplyModel>> = HashMap::new();
        for row in rows {
            buckets.entry(row.parent_reply_id).or_default().push(row);
        }

        let mut attached = 0usize;
        let replies = self.attach(&mut buckets, None, 0, &mut attached)?;

        if attached != total {
            return Err(ThreadTreeError::UnreachableReplies {
                count: total - attached,
            });
        }

        Ok(ThreadTree {
            thread: ThreadView {
                title: thread.title,
                content: thread.content,
            },
            replies,
        })
    }

    fn attach(
        &self,
        buckets: &mut HashMap<Option<ReplyId>, Vec<ReplyModel>>,
        parent: Option<ReplyId>,
        depth: usize,
        attached: &mut usize,
    ) -> Result<Vec<ReplyNode>, ThreadTreeError> {
        if depth > self.max_depth {
            return Err(ThreadTreeError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let Some(rows) = buckets.remove(&parent) else {
            return Ok(Vec::new());
        };

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            *attached += 1;
            let nested = self.attach(buckets, Some(row.id), depth + 1, attached)?;
            nodes.push(ReplyNode {
                id: row.id,
                content: row.content,
                replies: nested,
            });
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_course, seed_forum, seed_reply, seed_thread, seed_user, setup_test_db};
    use crate::entity::user::AccountType;
    use crate::error::ErrorKind;
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    #[tokio::test]
    async fn test_thread_without_replies_yields_empty_forest() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();

        assert_eq!(tree.thread.title, thread.title);
        assert_eq!(tree.thread.content, thread.content);
        assert!(tree.replies.is_empty());
    }

    #[tokio::test]
    async fn test_missing_thread_is_not_found() {
        let db = setup_test_db().await;

        let err = ThreadTreeBuilder::new(&db)
            .build(crate::ids::ThreadId::new(999_999))
            .await
            .unwrap_err();

        assert!(matches!(err, ThreadTreeError::ThreadNotFound));
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_linear_chain_nests_in_order() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let a = seed_reply(&db, thread.id, user.id, None, "a").await;
        let b = seed_reply(&db, thread.id, user.id, Some(a.id), "b").await;
        let c = seed_reply(&db, thread.id, user.id, Some(b.id), "c").await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();

        assert_eq!(tree.replies.len(), 1);
        let node_a = &tree.replies[0];
        assert_eq!(node_a.id, a.id);
        assert_eq!(node_a.replies.len(), 1);
        let node_b = &node_a.replies[0];
        assert_eq!(node_b.id, b.id);
        assert_eq!(node_b.replies.len(), 1);
        let node_c = &node_b.replies[0];
        assert_eq!(node_c.id, c.id);
        assert!(node_c.replies.is_empty());
    }

    #[tokio::test]
    async fn test_node_count_matches_row_count() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        // Two roots, one with two children, one grandchild
        let r1 = seed_reply(&db, thread.id, user.id, None, "r1").await;
        let _r2 = seed_reply(&db, thread.id, user.id, None, "r2").await;
        let c1 = seed_reply(&db, thread.id, user.id, Some(r1.id), "c1").await;
        let _c2 = seed_reply(&db, thread.id, user.id, Some(r1.id), "c2").await;
        let _g1 = seed_reply(&db, thread.id, user.id, Some(c1.id), "g1").await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();
        assert_eq!(tree.node_count(), 5);
    }

    #[tokio::test]
    async fn test_sibling_order_is_creation_order() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let first = seed_reply(&db, thread.id, user.id, None, "first").await;
        let second = seed_reply(&db, thread.id, user.id, None, "second").await;
        let third = seed_reply(&db, thread.id, user.id, None, "third").await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();
        let ids: Vec<_> = tree.replies.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[tokio::test]
    async fn test_replies_of_other_threads_are_excluded() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;
        let other = seed_thread(&db, forum.id, user.id).await;

        seed_reply(&db, thread.id, user.id, None, "mine").await;
        seed_reply(&db, other.id, user.id, None, "theirs").await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.replies[0].content, "mine");
    }

    #[tokio::test]
    async fn test_cyclic_parent_chain_fails_with_integrity_error() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let a = seed_reply(&db, thread.id, user.id, None, "a").await;
        let b = seed_reply(&db, thread.id, user.id, Some(a.id), "b").await;

        // Corrupt the data behind the service's back: a -> b -> a
        let mut cycle = a.into_active_model();
        cycle.parent_reply_id = Set(Some(b.id));
        cycle.update(&db).await.unwrap();

        let err = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap_err();
        assert!(matches!(
            err,
            ThreadTreeError::UnreachableReplies { count: 2 }
        ));
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::Integrity);
    }

    #[tokio::test]
    async fn test_depth_limit_rejects_pathological_chains() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let mut parent = None;
        for i in 0..6 {
            let reply = seed_reply(&db, thread.id, user.id, parent, &format!("r{i}")).await;
            parent = Some(reply.id);
        }

        let err = ThreadTreeBuilder::new(&db)
            .max_depth(3)
            .build(thread.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ThreadTreeError::DepthExceeded { limit: 3 }));

        // The same forest is fine under the default bound
        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();
        assert_eq!(tree.node_count(), 6);
    }

    #[tokio::test]
    async fn test_serialized_shape_matches_contract() {
        let db = setup_test_db().await;
        let user = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, user.id).await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;
        let a = seed_reply(&db, thread.id, user.id, None, "hello").await;

        let tree = ThreadTreeBuilder::new(&db).build(thread.id).await.unwrap();
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["thread"]["title"], thread.title);
        assert_eq!(json["thread"]["content"], thread.content);
        assert_eq!(json["replies"][0]["id"], a.id.as_i64());
        assert_eq!(json["replies"][0]["content"], "hello");
        assert!(json["replies"][0]["replies"].as_array().unwrap().is_empty());
    }
}
