use std::time::Duration;

use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{CourseId, ForumId, ReplyId, ThreadId, UserId},
    service::thread_tree::{ThreadTree, ThreadTreeBuilder, ThreadTreeError},
};

/// Upper bound on a single tree materialization. The builder does a fixed
/// number of queries, so this only trips when the store itself stalls.
const TRAVERSAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ForumsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("course not found")]
    CourseNotFound,

    #[error("forum not found")]
    ForumNotFound,

    #[error("thread not found")]
    ThreadNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("parent reply not found")]
    ParentReplyNotFound,

    #[error("parent reply belongs to a different thread")]
    CrossThreadParent,

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Tree(#[from] ThreadTreeError),

    #[error("thread traversal timed out")]
    TraversalTimeout,
}

impl From<ForumsServiceError> for ServiceError {
    fn from(error: ForumsServiceError) -> Self {
        match error {
            ForumsServiceError::DbError(error) => ServiceError::infra(error),
            ForumsServiceError::CourseNotFound => ServiceError::not_found(error),
            ForumsServiceError::ForumNotFound => ServiceError::not_found(error),
            ForumsServiceError::ThreadNotFound => ServiceError::not_found(error),
            ForumsServiceError::UserNotFound => ServiceError::not_found(error),
            ForumsServiceError::ParentReplyNotFound => ServiceError::not_found(error),
            ForumsServiceError::CrossThreadParent => ServiceError::integrity(error),
            ForumsServiceError::MissingField(_) => ServiceError::validation(error),
            ForumsServiceError::Tree(tree_error) => ServiceError::from(tree_error),
            ForumsServiceError::TraversalTimeout => ServiceError::infra(error),
        }
    }
}

#[derive(Clone)]
pub struct ForumsService {
    db: DatabaseConnection,
}

impl ForumsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a discussion forum under a course
    pub async fn create_forum(
        &self,
        course_id: CourseId,
        title: String,
    ) -> Result<ForumModel, ForumsServiceError> {
        if title.trim().is_empty() {
            return Err(ForumsServiceError::MissingField("forum title"));
        }

        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();

        if !course_exists {
            return Err(ForumsServiceError::CourseNotFound);
        }

        let forum = ForumActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(title),
        };

        let result = Forum::insert(forum).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    pub async fn get_forum(&self, forum_id: ForumId) -> Result<ForumModel, ForumsServiceError> {
        Forum::find_by_id(forum_id)
            .one(&self.db)
            .await?
            .ok_or(ForumsServiceError::ForumNotFound)
    }

    pub async fn forums_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<ForumModel>, ForumsServiceError> {
        let forums = Forum::find()
            .filter(ForumColumn::CourseId.eq(course_id))
            .order_by_asc(ForumColumn::Id)
            .all(&self.db)
            .await?;

        Ok(forums)
    }

    /// Open a new thread in a forum
    pub async fn create_thread(
        &self,
        forum_id: ForumId,
        user_id: UserId,
        title: String,
        content: String,
    ) -> Result<DiscussionThreadModel, ForumsServiceError> {
        if title.trim().is_empty() {
            return Err(ForumsServiceError::MissingField("thread title"));
        }

        let forum_exists = Forum::find_by_id(forum_id).one(&self.db).await?.is_some();
        if !forum_exists {
            return Err(ForumsServiceError::ForumNotFound);
        }

        let user_exists = User::find_by_id(user_id).one(&self.db).await?.is_some();
        if !user_exists {
            return Err(ForumsServiceError::UserNotFound);
        }

        let thread = DiscussionThreadActiveModel {
            id: NotSet,
            forum_id: Set(forum_id),
            user_id: Set(user_id),
            title: Set(title),
            content: Set(content),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = DiscussionThread::insert(thread)
            .exec_with_returning(&self.db)
            .await?;
        Ok(result)
    }

    /// List a forum's threads in creation order
    pub async fn threads_for_forum(
        &self,
        forum_id: ForumId,
    ) -> Result<Vec<DiscussionThreadModel>, ForumsServiceError> {
        let threads = DiscussionThread::find()
            .filter(DiscussionThreadColumn::ForumId.eq(forum_id))
            .order_by_asc(DiscussionThreadColumn::CreatedAt)
            .order_by_asc(DiscussionThreadColumn::Id)
            .all(&self.db)
            .await?;

        Ok(threads)
    }

    /// Post a reply to a thread, optionally nested under another reply.
    ///
    /// A parent reply must live in the same thread; replies pointing across
    /// threads are rejected here rather than filtered out at read time.
    pub async fn create_reply(
        &self,
        thread_id: ThreadId,
        user_id: UserId,
        content: String,
        parent_reply_id: Option<ReplyId>,
    ) -> Result<ReplyModel, ForumsServiceError> {
        if content.trim().is_empty() {
            return Err(ForumsServiceError::MissingField("reply content"));
        }

        let thread_exists = DiscussionThread::find_by_id(thread_id)
            .one(&self.db)
            .await?
            .is_some();
        if !thread_exists {
            return Err(ForumsServiceError::ThreadNotFound);
        }

        let user_exists = User::find_by_id(user_id).one(&self.db).await?.is_some();
        if !user_exists {
            return Err(ForumsServiceError::UserNotFound);
        }

        if let Some(parent_id) = parent_reply_id {
            let parent = Reply::find_by_id(parent_id)
                .one(&self.db)
                .await?
                .ok_or(ForumsServiceError::ParentReplyNotFound)?;

            if parent.thread_id != thread_id {
                return Err(ForumsServiceError::CrossThreadParent);
            }
        }

        let reply = ReplyActiveModel {
            id: NotSet,
            thread_id: Set(thread_id),
            user_id: Set(user_id),
            parent_reply_id: Set(parent_reply_id),
            content: Set(content),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = Reply::insert(reply).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    /// Materialize a thread with its whole nested reply forest.
    ///
    /// Fails atomically: a store error or integrity problem mid-traversal
    /// never yields a partial tree.
    pub async fn get_thread_with_replies(
        &self,
        thread_id: ThreadId,
    ) -> Result<ThreadTree, ForumsServiceError> {
        let builder = ThreadTreeBuilder::new(&self.db);

        match tokio::time::timeout(TRAVERSAL_TIMEOUT, builder.build(thread_id)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ForumsServiceError::TraversalTimeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::AccountType;
    use crate::error::ErrorKind;
    use crate::test_utils::{seed_course, seed_forum, seed_thread, seed_user, setup_test_db};

    async fn setup() -> (DatabaseConnection, ForumsService, UserModel, CourseModel) {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let course = seed_course(&db, 101, lecturer.id).await;
        let service = ForumsService::new(db.clone());
        (db, service, lecturer, course)
    }

    #[tokio::test]
    async fn test_create_forum_requires_existing_course() {
        let (_db, service, _user, _course) = setup().await;

        let err = service
            .create_forum(CourseId::new(999), "General".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumsServiceError::CourseNotFound));
    }

    #[tokio::test]
    async fn test_create_forum_and_list() {
        let (_db, service, _user, course) = setup().await;

        let forum = service
            .create_forum(course.id, "General".to_string())
            .await
            .unwrap();
        assert_eq!(forum.course_id, course.id);

        let forums = service.forums_for_course(course.id).await.unwrap();
        assert_eq!(forums.len(), 1);
        assert_eq!(forums[0].title, "General");
    }

    #[tokio::test]
    async fn test_create_thread_validates_forum_and_user() {
        let (db, service, user, course) = setup().await;
        let forum = seed_forum(&db, course.id).await;

        let err = service
            .create_thread(ForumId::new(999), user.id, "t".into(), "c".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumsServiceError::ForumNotFound));

        let err = service
            .create_thread(forum.id, UserId::new(999), "t".into(), "c".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ForumsServiceError::UserNotFound));

        let thread = service
            .create_thread(forum.id, user.id, "Week 1".into(), "Questions here".into())
            .await
            .unwrap();
        assert_eq!(thread.forum_id, forum.id);

        let threads = service.threads_for_forum(forum.id).await.unwrap();
        assert_eq!(threads.len(), 1);
    }

    #[tokio::test]
    async fn test_reply_to_missing_thread_is_not_found() {
        let (_db, service, user, _course) = setup().await;

        let err = service
            .create_reply(ThreadId::new(999), user.id, "hi".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ForumsServiceError::ThreadNotFound));
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cross_thread_parent_is_rejected_at_write_time() {
        let (db, service, user, course) = setup().await;
        let forum = seed_forum(&db, course.id).await;
        let thread_a = seed_thread(&db, forum.id, user.id).await;
        let thread_b = seed_thread(&db, forum.id, user.id).await;

        let root_a = service
            .create_reply(thread_a.id, user.id, "in a".into(), None)
            .await
            .unwrap();

        let err = service
            .create_reply(thread_b.id, user.id, "wrong parent".into(), Some(root_a.id))
            .await
            .unwrap_err();
        assert!(matches!(err, ForumsServiceError::CrossThreadParent));
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::Integrity);

        // Nothing was written for the rejected reply
        let tree = service.get_thread_with_replies(thread_b.id).await.unwrap();
        assert_eq!(tree.node_count(), 0);
    }

    #[tokio::test]
    async fn test_get_thread_with_replies_nests_replies() {
        let (db, service, user, course) = setup().await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let root = service
            .create_reply(thread.id, user.id, "root".into(), None)
            .await
            .unwrap();
        let child = service
            .create_reply(thread.id, user.id, "child".into(), Some(root.id))
            .await
            .unwrap();

        let tree = service.get_thread_with_replies(thread.id).await.unwrap();
        assert_eq!(tree.node_count(), 2);
        assert_eq!(tree.replies[0].id, root.id);
        assert_eq!(tree.replies[0].replies[0].id, child.id);
    }

    #[tokio::test]
    async fn test_empty_reply_content_is_validation_error() {
        let (db, service, user, course) = setup().await;
        let forum = seed_forum(&db, course.id).await;
        let thread = seed_thread(&db, forum.id, user.id).await;

        let err = service
            .create_reply(thread.id, user.id, "   ".into(), None)
            .await
            .unwrap_err();
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::Validation);
    }
}
