// SeaORM entities
// One module per table; the prelude re-exports everything the services need.

pub mod assignment;
pub mod calendar_event;
pub mod course;
pub mod discussion_thread;
pub mod enrollment;
pub mod forum;
pub mod reply;
pub mod section;
pub mod section_item;
pub mod submission;
pub mod user;


pub mod prelude {
    // Re-export all entities for convenience
    pub use super::assignment::{
        ActiveModel as AssignmentActiveModel, Column as AssignmentColumn, Entity as Assignment,
        Model as AssignmentModel,
    };
    pub use super::calendar_event::{
        ActiveModel as CalendarEventActiveModel, Column as CalendarEventColumn,
        Entity as CalendarEvent, Model as CalendarEventModel,
    };
    pub use super::course::{
        ActiveModel as CourseActiveModel, Column as CourseColumn, Entity as Course,
        Model as CourseModel,
    };
    pub use super::discussion_thread::{
        ActiveModel as DiscussionThreadActiveModel, Column as DiscussionThreadColumn,
        Entity as DiscussionThread, Model as DiscussionThreadModel,
    };
    pub use super::enrollment::{
        ActiveModel as EnrollmentActiveModel, Column as EnrollmentColumn, Entity as Enrollment,
        Model as EnrollmentModel,
    };
    pub use super::forum::{
        ActiveModel as ForumActiveModel, Column as ForumColumn, Entity as Forum,
        Model as ForumModel,
    };
    pub use super::reply::{
        ActiveModel as ReplyActiveModel, Column as ReplyColumn, Entity as Reply,
        Model as ReplyModel,
    };
    pub use super::section::{
        ActiveModel as SectionActiveModel, Column as SectionColumn, Entity as Section,
        Model as SectionModel,
    };
    pub use super::section_item::{
        ActiveModel as SectionItemActiveModel, Column as SectionItemColumn, Entity as SectionItem,
        ItemType, Model as SectionItemModel,
    };
    pub use super::submission::{
        ActiveModel as SubmissionActiveModel, Column as SubmissionColumn, Entity as Submission,
        Model as SubmissionModel,
    };
    pub use super::user::{
        AccountType, ActiveModel as UserActiveModel, Column as UserColumn, Entity as User,
        Model as UserModel,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait,
        ActiveValue,

        ColumnTrait,
        ConnectionTrait,

        // Database and connection types
        Database,
        DatabaseConnection,
        DbConn,
        // Common result types
        DbErr,
        Delete,

        // Core traits
        EntityTrait,
        Insert,
        ModelTrait,
        NotSet,
        // Pagination
        PaginatorTrait,
        QueryFilter,
        QueryOrder,
        QuerySelect,
        Related,
        RelationTrait,
        // Query builders
        Select,
        // Active model helpers
        Set,
        TransactionTrait,

        Unchanged,
        Update,
    };
}
