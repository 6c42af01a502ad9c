use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{CourseId, UserId},
};

#[derive(Debug, Error)]
pub enum ReportsServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),
}

impl From<ReportsServiceError> for ServiceError {
    fn from(error: ReportsServiceError) -> Self {
        match error {
            ReportsServiceError::DbError(error) => ServiceError::infra(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEnrollmentCount {
    pub course_id: CourseId,
    pub title: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCourseCount {
    pub student_id: UserId,
    pub student_name: String,
    pub course_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LecturerCourseCount {
    pub lecturer_id: UserId,
    pub lecturer_name: String,
    pub course_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAverage {
    pub student_id: UserId,
    pub name: String,
    pub average_grade: f64,
}

/// Tabular aggregate views. Counts are grouped in the store; grade averages
/// are folded in memory over one scan of the graded submissions.
#[derive(Clone)]
pub struct ReportsService {
    db: DatabaseConnection,
}

impl ReportsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn enrollment_counts(&self) -> Result<Vec<(CourseId, i64)>, ReportsServiceError> {
        let counts: Vec<(CourseId, i64)> = Enrollment::find()
            .select_only()
            .column(EnrollmentColumn::CourseId)
            .column_as(EnrollmentColumn::UserId.count(), "student_count")
            .group_by(EnrollmentColumn::CourseId)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(counts)
    }

    async fn course_counts_to_report(
        &self,
        mut counts: Vec<(CourseId, i64)>,
    ) -> Result<Vec<CourseEnrollmentCount>, ReportsServiceError> {
        // Largest first; course id breaks ties so the table is stable
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let course_ids: Vec<CourseId> = counts.iter().map(|(id, _)| *id).collect();
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let titles: HashMap<CourseId, String> = Course::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();

        Ok(counts
            .into_iter()
            .filter_map(|(course_id, student_count)| {
                titles.get(&course_id).map(|title| CourseEnrollmentCount {
                    course_id,
                    title: title.clone(),
                    student_count,
                })
            })
            .collect())
    }

    /// Courses with at least `min_students` enrolled (the "50+" report)
    pub async fn courses_with_at_least(
        &self,
        min_students: i64,
    ) -> Result<Vec<CourseEnrollmentCount>, ReportsServiceError> {
        let counts = self
            .enrollment_counts()
            .await?
            .into_iter()
            .filter(|(_, n)| *n >= min_students)
            .collect();
        self.course_counts_to_report(counts).await
    }

    /// Most-enrolled courses, largest first
    pub async fn top_enrolled_courses(
        &self,
        limit: usize,
    ) -> Result<Vec<CourseEnrollmentCount>, ReportsServiceError> {
        let counts = self.enrollment_counts().await?;
        let mut report = self.course_counts_to_report(counts).await?;
        report.truncate(limit);
        Ok(report)
    }

    /// Students enrolled in at least `min_courses` courses (the "5+" report)
    pub async fn students_with_at_least(
        &self,
        min_courses: i64,
    ) -> Result<Vec<StudentCourseCount>, ReportsServiceError> {
        let counts: Vec<(UserId, i64)> = Enrollment::find()
            .select_only()
            .column(EnrollmentColumn::UserId)
            .column_as(EnrollmentColumn::CourseId.count(), "course_count")
            .group_by(EnrollmentColumn::UserId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts: Vec<(UserId, i64)> = counts
            .into_iter()
            .filter(|(_, n)| *n >= min_courses)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<UserId> = counts.iter().map(|(id, _)| *id).collect();
        let names: HashMap<UserId, String> = User::find()
            .filter(UserColumn::Id.is_in(student_ids))
            .filter(UserColumn::AccountType.eq(AccountType::Student))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(counts
            .into_iter()
            .filter_map(|(student_id, course_count)| {
                names.get(&student_id).map(|name| StudentCourseCount {
                    student_id,
                    student_name: name.clone(),
                    course_count,
                })
            })
            .collect())
    }

    /// Lecturers teaching at least `min_courses` courses (the "3+" report)
    pub async fn lecturers_with_at_least(
        &self,
        min_courses: i64,
    ) -> Result<Vec<LecturerCourseCount>, ReportsServiceError> {
        let counts: Vec<(UserId, i64)> = Course::find()
            .select_only()
            .column(CourseColumn::LecturerId)
            .column_as(CourseColumn::Id.count(), "course_count")
            .group_by(CourseColumn::LecturerId)
            .into_tuple()
            .all(&self.db)
            .await?;

        let mut counts: Vec<(UserId, i64)> = counts
            .into_iter()
            .filter(|(_, n)| *n >= min_courses)
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let lecturer_ids: Vec<UserId> = counts.iter().map(|(id, _)| *id).collect();
        let names: HashMap<UserId, String> = User::find()
            .filter(UserColumn::Id.is_in(lecturer_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        Ok(counts
            .into_iter()
            .filter_map(|(lecturer_id, course_count)| {
                names.get(&lecturer_id).map(|name| LecturerCourseCount {
                    lecturer_id,
                    lecturer_name: name.clone(),
                    course_count,
                })
            })
            .collect())
    }

    /// Best-averaging students over their graded submissions, two-decimal
    /// rounding as the original report tables carried
    pub async fn top_students_by_average(
        &self,
        limit: usize,
    ) -> Result<Vec<StudentAverage>, ReportsServiceError> {
        let graded = Submission::find()
            .filter(SubmissionColumn::Grade.is_not_null())
            .all(&self.db)
            .await?;

        let mut sums: HashMap<UserId, (f64, u32)> = HashMap::new();
        for submission in graded {
            if let Some(grade) = submission.grade {
                let entry = sums.entry(submission.user_id).or_insert((0.0, 0));
                entry.0 += grade;
                entry.1 += 1;
            }
        }

        if sums.is_empty() {
            return Ok(Vec::new());
        }

        let student_ids: Vec<UserId> = sums.keys().copied().collect();
        let students = User::find()
            .filter(UserColumn::Id.is_in(student_ids))
            .filter(UserColumn::AccountType.eq(AccountType::Student))
            .all(&self.db)
            .await?;

        let mut report: Vec<StudentAverage> = students
            .into_iter()
            .filter_map(|u| {
                sums.get(&u.id).map(|(sum, count)| StudentAverage {
                    student_id: u.id,
                    name: u.name,
                    average_grade: ((sum / *count as f64) * 100.0).round() / 100.0,
                })
            })
            .collect();

        report.sort_by(|a, b| {
            b.average_grade
                .total_cmp(&a.average_grade)
                .then(a.student_id.cmp(&b.student_id))
        });
        report.truncate(limit);
        Ok(report)
    }
}
