pub mod assignments;
pub mod calendar;
pub mod content;
pub mod courses;
pub mod forums;
pub mod reports;
pub mod thread_tree;
pub mod users;
