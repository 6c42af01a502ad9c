pub mod entity;
pub mod ids;
pub mod models;
use tokio::sync::OnceCell;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::service::{
    assignments::AssignmentsService, calendar::CalendarService, content::ContentService,
    courses::CoursesService, forums::ForumsService, reports::ReportsService, users::UsersService,
};

pub mod service;

pub mod error;

pub mod config;

pub mod test_utils;

static CAMPUS_CORE: OnceCell<Arc<CampusCore>> = OnceCell::const_new();

pub async fn core() -> Arc<CampusCore> {
    CAMPUS_CORE
        .get_or_init(|| async move { Arc::new(CampusCore::start().await.expect("failed to init")) })
        .await
        .clone()
}

/// Main runtime handle. Owns the store connection and one service per
/// functional area; the HTTP shell calls straight into these.
pub struct CampusCore {
    pub config: config::CampusConfig,

    pub db: DatabaseConnection,

    pub users: UsersService,
    pub courses: CoursesService,
    pub assignments: AssignmentsService,
    pub forums: ForumsService,
    pub content: ContentService,
    pub calendar: CalendarService,
    pub reports: ReportsService,
}

impl CampusCore {
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        let config = config::get_or_init().await?;

        // DB + migrations
        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;

        let users = UsersService::new(db.clone());
        let courses = CoursesService::new(db.clone());
        let assignments = AssignmentsService::new(db.clone());
        let forums = ForumsService::new(db.clone());
        let content = ContentService::new(db.clone());
        let calendar = CalendarService::new(db.clone());
        let reports = ReportsService::new(db.clone());

        Ok(Self {
            config,
            db,
            users,
            courses,
            assignments,
            forums,
            content,
            calendar,
            reports,
        })
    }
}

pub mod prelude {
    pub use super::entity;
    pub use super::ids;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;
}
