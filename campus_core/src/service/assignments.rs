use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{AssignmentId, CourseId, UserId},
};

#[derive(Debug, Error)]
pub enum AssignmentsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error("malformed date, expected YYYY-MM-DD")]
    InvalidDate,

    #[error("grade must be between 0 and 100")]
    InvalidGrade,

    #[error("course not found")]
    CourseNotFound,

    #[error("assignment not found")]
    AssignmentNotFound,

    #[error("student not found")]
    StudentNotFound,

    #[error("submission not found")]
    SubmissionNotFound,

    #[error("assignment already submitted by this student")]
    AlreadySubmitted,
}

impl From<AssignmentsServiceError> for ServiceError {
    fn from(error: AssignmentsServiceError) -> Self {
        match error {
            AssignmentsServiceError::DbError(error) => ServiceError::infra(error),
            AssignmentsServiceError::MissingField(_) => ServiceError::validation(error),
            AssignmentsServiceError::InvalidDate => ServiceError::validation(error),
            AssignmentsServiceError::InvalidGrade => ServiceError::validation(error),
            AssignmentsServiceError::CourseNotFound => ServiceError::not_found(error),
            AssignmentsServiceError::AssignmentNotFound => ServiceError::not_found(error),
            AssignmentsServiceError::StudentNotFound => ServiceError::not_found(error),
            AssignmentsServiceError::SubmissionNotFound => ServiceError::not_found(error),
            AssignmentsServiceError::AlreadySubmitted => ServiceError::validation(error),
        }
    }
}

#[derive(Clone)]
pub struct AssignmentsService {
    db: DatabaseConnection,
}

impl AssignmentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_assignment(
        &self,
        course_id: CourseId,
        title: String,
        due_date: String,
    ) -> Result<AssignmentModel, AssignmentsServiceError> {
        if title.trim().is_empty() {
            return Err(AssignmentsServiceError::MissingField("assignment title"));
        }
        if NaiveDate::parse_from_str(&due_date, "%Y-%m-%d").is_err() {
            return Err(AssignmentsServiceError::InvalidDate);
        }

        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();
        if !course_exists {
            return Err(AssignmentsServiceError::CourseNotFound);
        }

        let assignment = AssignmentActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(title),
            due_date: Set(due_date),
        };

        let result = Assignment::insert(assignment)
            .exec_with_returning(&self.db)
            .await?;
        Ok(result)
    }

    pub async fn assignments_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<AssignmentModel>, AssignmentsServiceError> {
        let assignments = Assignment::find()
            .filter(AssignmentColumn::CourseId.eq(course_id))
            .order_by_asc(AssignmentColumn::Id)
            .all(&self.db)
            .await?;
        Ok(assignments)
    }

    /// Record a student's submission for an assignment
    pub async fn submit(
        &self,
        assignment_id: AssignmentId,
        student_id: UserId,
        file_link: String,
        submitted_at: String,
    ) -> Result<SubmissionModel, AssignmentsServiceError> {
        if file_link.trim().is_empty() {
            return Err(AssignmentsServiceError::MissingField("file link"));
        }
        if submitted_at.trim().is_empty() {
            return Err(AssignmentsServiceError::MissingField("submission time"));
        }

        let assignment_exists = Assignment::find_by_id(assignment_id)
            .one(&self.db)
            .await?
            .is_some();
        if !assignment_exists {
            return Err(AssignmentsServiceError::AssignmentNotFound);
        }

        let student_exists = User::find_by_id(student_id).one(&self.db).await?.is_some();
        if !student_exists {
            return Err(AssignmentsServiceError::StudentNotFound);
        }

        let already = Submission::find_by_id((assignment_id, student_id))
            .one(&self.db)
            .await?
            .is_some();
        if already {
            return Err(AssignmentsServiceError::AlreadySubmitted);
        }

        let submission = SubmissionActiveModel {
            assignment_id: Set(assignment_id),
            user_id: Set(student_id),
            file_link: Set(file_link),
            submitted_at: Set(submitted_at),
            grade: Set(None),
        };

        let result = Submission::insert(submission)
            .exec_with_returning(&self.db)
            .await?;
        Ok(result)
    }

    /// Grade a submission, overwriting any previous grade
    pub async fn grade(
        &self,
        assignment_id: AssignmentId,
        student_id: UserId,
        grade: f64,
    ) -> Result<SubmissionModel, AssignmentsServiceError> {
        if !(0.0..=100.0).contains(&grade) {
            return Err(AssignmentsServiceError::InvalidGrade);
        }

        let submission = Submission::find_by_id((assignment_id, student_id))
            .one(&self.db)
            .await?
            .ok_or(AssignmentsServiceError::SubmissionNotFound)?;

        let mut active: SubmissionActiveModel = submission.into();
        active.grade = Set(Some(grade));

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Mean of a student's graded submissions; None if nothing is graded yet
    pub async fn student_average(
        &self,
        student_id: UserId,
    ) -> Result<Option<f64>, AssignmentsServiceError> {
        let graded = Submission::find()
            .filter(SubmissionColumn::UserId.eq(student_id))
            .filter(SubmissionColumn::Grade.is_not_null())
            .all(&self.db)
            .await?;

        if graded.is_empty() {
            return Ok(None);
        }

        let sum: f64 = graded.iter().filter_map(|s| s.grade).sum();
        Ok(Some(sum / graded.len() as f64))
    }
}
