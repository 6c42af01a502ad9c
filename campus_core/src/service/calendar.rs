use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{CourseId, UserId},
};

#[derive(Debug, Error)]
pub enum CalendarServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error("malformed date, expected YYYY-MM-DD")]
    InvalidDate,

    #[error("course not found")]
    CourseNotFound,
}

impl From<CalendarServiceError> for ServiceError {
    fn from(error: CalendarServiceError) -> Self {
        match error {
            CalendarServiceError::DbError(error) => ServiceError::infra(error),
            CalendarServiceError::MissingField(_) => ServiceError::validation(error),
            CalendarServiceError::InvalidDate => ServiceError::validation(error),
            CalendarServiceError::CourseNotFound => ServiceError::not_found(error),
        }
    }
}

#[derive(Clone)]
pub struct CalendarService {
    db: DatabaseConnection,
}

impl CalendarService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_event(
        &self,
        course_id: CourseId,
        title: String,
        event_date: String,
    ) -> Result<CalendarEventModel, CalendarServiceError> {
        if title.trim().is_empty() {
            return Err(CalendarServiceError::MissingField("event title"));
        }
        if NaiveDate::parse_from_str(&event_date, "%Y-%m-%d").is_err() {
            return Err(CalendarServiceError::InvalidDate);
        }

        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();
        if !course_exists {
            return Err(CalendarServiceError::CourseNotFound);
        }

        let event = CalendarEventActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(title),
            event_date: Set(event_date),
        };

        let result = CalendarEvent::insert(event)
            .exec_with_returning(&self.db)
            .await?;
        Ok(result)
    }

    pub async fn events_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<CalendarEventModel>, CalendarServiceError> {
        let events = CalendarEvent::find()
            .filter(CalendarEventColumn::CourseId.eq(course_id))
            .order_by_asc(CalendarEventColumn::EventDate)
            .order_by_asc(CalendarEventColumn::Id)
            .all(&self.db)
            .await?;
        Ok(events)
    }

    /// Events on one day across every course the student is enrolled in
    pub async fn events_for_student_on(
        &self,
        student_id: UserId,
        date: &str,
    ) -> Result<Vec<CalendarEventModel>, CalendarServiceError> {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(CalendarServiceError::InvalidDate);
        }

        let course_ids: Vec<CourseId> = Enrollment::find()
            .filter(EnrollmentColumn::UserId.eq(student_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.course_id)
            .collect();

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let events = CalendarEvent::find()
            .filter(CalendarEventColumn::CourseId.is_in(course_ids))
            .filter(CalendarEventColumn::EventDate.eq(date))
            .order_by_asc(CalendarEventColumn::Id)
            .all(&self.db)
            .await?;
        Ok(events)
    }
}
