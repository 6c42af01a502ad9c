//! Shared helpers for the in-crate test suites: an in-memory database with
//! the full schema applied, plus seed functions that insert rows directly,
//! bypassing service-level validation.

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::entity::prelude::*;
use crate::entity::user::AccountType;
use crate::ids::{CourseId, ForumId, ReplyId, ThreadId, UserId};
use crate::models::migrator::Migrator;

/// Fresh in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn seed_user(db: &DatabaseConnection, id: i64, account_type: AccountType) -> UserModel {
    let user = UserActiveModel {
        id: Set(UserId::new(id)),
        name: Set(format!("User {id}")),
        account_type: Set(account_type),
        email: Set(format!("user{id}@campus.edu")),
        password_salt: Set("saltsaltsaltsalt".to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    User::insert(user)
        .exec_with_returning(db)
        .await
        .expect("Failed to seed user")
}

pub async fn seed_course(db: &DatabaseConnection, id: i64, lecturer_id: UserId) -> CourseModel {
    let course = CourseActiveModel {
        id: Set(CourseId::new(id)),
        title: Set(format!("Course {id}")),
        description: Set("Seeded course".to_string()),
        lecturer_id: Set(lecturer_id),
    };

    Course::insert(course)
        .exec_with_returning(db)
        .await
        .expect("Failed to seed course")
}

pub async fn seed_forum(db: &DatabaseConnection, course_id: CourseId) -> ForumModel {
    let forum = ForumActiveModel {
        id: NotSet,
        course_id: Set(course_id),
        title: Set("Seeded forum".to_string()),
    };

    Forum::insert(forum)
        .exec_with_returning(db)
        .await
        .expect("Failed to seed forum")
}

pub async fn seed_thread(
    db: &DatabaseConnection,
    forum_id: ForumId,
    user_id: UserId,
) -> DiscussionThreadModel {
    let thread = DiscussionThreadActiveModel {
        id: NotSet,
        forum_id: Set(forum_id),
        user_id: Set(user_id),
        title: Set("Seeded thread".to_string()),
        content: Set("Seeded thread content".to_string()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    DiscussionThread::insert(thread)
        .exec_with_returning(db)
        .await
        .expect("Failed to seed thread")
}

pub async fn seed_reply(
    db: &DatabaseConnection,
    thread_id: ThreadId,
    user_id: UserId,
    parent_reply_id: Option<ReplyId>,
    content: &str,
) -> ReplyModel {
    let reply = ReplyActiveModel {
        id: NotSet,
        thread_id: Set(thread_id),
        user_id: Set(user_id),
        parent_reply_id: Set(parent_reply_id),
        content: Set(content.to_string()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
    };

    Reply::insert(reply)
        .exec_with_returning(db)
        .await
        .expect("Failed to seed reply")
}
