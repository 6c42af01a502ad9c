use sea_orm::sea_query::OnConflict;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    error::ServiceError,
    ids::{CourseId, UserId},
};

#[derive(Debug, Error)]
pub enum CoursesServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error("only admins can create courses")]
    NotAdmin,

    #[error("a course with this id already exists")]
    CourseIdTaken,

    #[error("course not found")]
    CourseNotFound,

    #[error("lecturer not found")]
    LecturerNotFound,

    #[error("student not found")]
    StudentNotFound,
}

impl From<CoursesServiceError> for ServiceError {
    fn from(error: CoursesServiceError) -> Self {
        match error {
            CoursesServiceError::DbError(error) => ServiceError::infra(error),
            CoursesServiceError::MissingField(_) => ServiceError::validation(error),
            // 403 at the HTTP layer
            CoursesServiceError::NotAdmin => ServiceError::validation(error),
            CoursesServiceError::CourseIdTaken => ServiceError::validation(error),
            CoursesServiceError::CourseNotFound => ServiceError::not_found(error),
            CoursesServiceError::LecturerNotFound => ServiceError::not_found(error),
            CoursesServiceError::StudentNotFound => ServiceError::not_found(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub lecturer_id: UserId,
}

/// Minimal course listing entry (id + title), as the student/lecturer
/// course lists return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub course_id: CourseId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberView {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMembers {
    pub course_id: CourseId,
    pub member_count: usize,
    pub members: Vec<MemberView>,
}

#[derive(Clone)]
pub struct CoursesService {
    db: DatabaseConnection,
}

impl CoursesService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a course. Only admins may; the acting account's role comes
    /// from the already-authenticated caller.
    pub async fn create_course(
        &self,
        new_course: NewCourse,
        acting: AccountType,
    ) -> Result<CourseModel, CoursesServiceError> {
        if acting != AccountType::Admin {
            return Err(CoursesServiceError::NotAdmin);
        }
        if new_course.title.trim().is_empty() {
            return Err(CoursesServiceError::MissingField("course title"));
        }

        let id_taken = Course::find_by_id(new_course.id)
            .one(&self.db)
            .await?
            .is_some();
        if id_taken {
            return Err(CoursesServiceError::CourseIdTaken);
        }

        let lecturer_exists = User::find_by_id(new_course.lecturer_id)
            .one(&self.db)
            .await?
            .is_some();
        if !lecturer_exists {
            return Err(CoursesServiceError::LecturerNotFound);
        }

        let course = CourseActiveModel {
            id: Set(new_course.id),
            title: Set(new_course.title),
            description: Set(new_course.description),
            lecturer_id: Set(new_course.lecturer_id),
        };

        let result = Course::insert(course).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseModel>, CoursesServiceError> {
        let courses = Course::find()
            .order_by_asc(CourseColumn::Id)
            .all(&self.db)
            .await?;
        Ok(courses)
    }

    pub async fn get_course(
        &self,
        course_id: CourseId,
    ) -> Result<CourseModel, CoursesServiceError> {
        Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .ok_or(CoursesServiceError::CourseNotFound)
    }

    /// Courses a student is enrolled in
    pub async fn courses_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<CourseRef>, CoursesServiceError> {
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

        let courses = Course::find()
            .filter(CourseColumn::Id.is_in(course_ids))
            .order_by_asc(CourseColumn::Id)
            .all(&self.db)
            .await?;

        Ok(courses
            .into_iter()
            .map(|c| CourseRef {
                course_id: c.id,
                title: c.title,
            })
            .collect())
    }

    /// Courses taught by a lecturer
    pub async fn courses_for_lecturer(
        &self,
        lecturer_id: UserId,
    ) -> Result<Vec<CourseRef>, CoursesServiceError> {
        let courses = Course::find()
            .filter(CourseColumn::LecturerId.eq(lecturer_id))
            .order_by_asc(CourseColumn::Id)
            .all(&self.db)
            .await?;

        Ok(courses
            .into_iter()
            .map(|c| CourseRef {
                course_id: c.id,
                title: c.title,
            })
            .collect())
    }

    /// Enroll a student in a course. Enrolling twice is a no-op.
    pub async fn enroll(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<(), CoursesServiceError> {
        let student_exists = User::find_by_id(student_id).one(&self.db).await?.is_some();
        if !student_exists {
            return Err(CoursesServiceError::StudentNotFound);
        }

        let course_exists = Course::find_by_id(course_id)
            .one(&self.db)
            .await?
            .is_some();
        if !course_exists {
            return Err(CoursesServiceError::CourseNotFound);
        }

        let enrollment = EnrollmentActiveModel {
            user_id: Set(student_id),
            course_id: Set(course_id),
        };

        // ON CONFLICT DO NOTHING keeps this idempotent
        Enrollment::insert(enrollment)
            .on_conflict(
                OnConflict::columns([EnrollmentColumn::UserId, EnrollmentColumn::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    pub async fn is_enrolled(
        &self,
        student_id: UserId,
        course_id: CourseId,
    ) -> Result<bool, CoursesServiceError> {
        let enrollment = Enrollment::find_by_id((student_id, course_id))
            .one(&self.db)
            .await?;
        Ok(enrollment.is_some())
    }

    /// Lecturer plus enrolled students, with roles
    pub async fn course_members(
        &self,
        course_id: CourseId,
    ) -> Result<CourseMembers, CoursesServiceError> {
        let course = self.get_course(course_id).await?;

        let mut members = Vec::new();

        if let Some(lecturer) = User::find_by_id(course.lecturer_id).one(&self.db).await? {
            members.push(MemberView {
                user_id: lecturer.id,
                name: lecturer.name,
                email: lecturer.email,
                role: "Lecturer".to_string(),
            });
        }

        let student_ids: Vec<UserId> = Enrollment::find()
            .filter(EnrollmentColumn::CourseId.eq(course_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.user_id)
            .collect();

        if !student_ids.is_empty() {
            let students = User::find()
                .filter(UserColumn::Id.is_in(student_ids))
                .filter(UserColumn::AccountType.eq(AccountType::Student))
                .order_by_asc(UserColumn::Id)
                .all(&self.db)
                .await?;

            for student in students {
                members.push(MemberView {
                    user_id: student.id,
                    name: student.name,
                    email: student.email,
                    role: "Student".to_string(),
                });
            }
        }

        Ok(CourseMembers {
            course_id,
            member_count: members.len(),
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seed_course, seed_user, setup_test_db};
    use crate::entity::user::AccountType;

    fn new_course(id: i64, lecturer: UserId) -> NewCourse {
        NewCourse {
            id: CourseId::new(id),
            title: format!("Course {id}"),
            description: "desc".to_string(),
            lecturer_id: lecturer,
        }
    }

    #[tokio::test]
    async fn test_create_course_is_admin_only() {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let service = CoursesService::new(db);

        let err = service
            .create_course(new_course(101, lecturer.id), AccountType::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, CoursesServiceError::NotAdmin));

        let course = service
            .create_course(new_course(101, lecturer.id), AccountType::Admin)
            .await
            .unwrap();
        assert_eq!(course.id, CourseId::new(101));
    }

    #[tokio::test]
    async fn test_create_course_requires_existing_lecturer() {
        let db = setup_test_db().await;
        let service = CoursesService::new(db);

        let err = service
            .create_course(new_course(101, UserId::new(999)), AccountType::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, CoursesServiceError::LecturerNotFound));
    }

    #[tokio::test]
    async fn test_enroll_is_idempotent() {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let student = seed_user(&db, 1, AccountType::Student).await;
        let course = seed_course(&db, 101, lecturer.id).await;
        let service = CoursesService::new(db);

        service.enroll(student.id, course.id).await.unwrap();
        service.enroll(student.id, course.id).await.unwrap();

        assert!(service.is_enrolled(student.id, course.id).await.unwrap());
        let courses = service.courses_for_student(student.id).await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].course_id, course.id);
    }

    #[tokio::test]
    async fn test_enroll_missing_refs_are_not_found() {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let course = seed_course(&db, 101, lecturer.id).await;
        let service = CoursesService::new(db);

        let err = service
            .enroll(UserId::new(999), course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoursesServiceError::StudentNotFound));

        let err = service
            .enroll(lecturer.id, CourseId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, CoursesServiceError::CourseNotFound));
    }

    #[tokio::test]
    async fn test_courses_for_lecturer() {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let other = seed_user(&db, 11, AccountType::Lecturer).await;
        seed_course(&db, 101, lecturer.id).await;
        seed_course(&db, 102, lecturer.id).await;
        seed_course(&db, 103, other.id).await;
        let service = CoursesService::new(db);

        let courses = service.courses_for_lecturer(lecturer.id).await.unwrap();
        assert_eq!(courses.len(), 2);
    }

    #[tokio::test]
    async fn test_course_members_lists_lecturer_first() {
        let db = setup_test_db().await;
        let lecturer = seed_user(&db, 10, AccountType::Lecturer).await;
        let s1 = seed_user(&db, 1, AccountType::Student).await;
        let s2 = seed_user(&db, 2, AccountType::Student).await;
        let course = seed_course(&db, 101, lecturer.id).await;
        let service = CoursesService::new(db);

        service.enroll(s1.id, course.id).await.unwrap();
        service.enroll(s2.id, course.id).await.unwrap();

        let members = service.course_members(course.id).await.unwrap();
        assert_eq!(members.member_count, 3);
        assert_eq!(members.members[0].role, "Lecturer");
        assert_eq!(members.members[0].user_id, lecturer.id);
        assert!(members.members[1..].iter().all(|m| m.role == "Student"));
    }

    #[tokio::test]
    async fn test_course_members_of_missing_course() {
        let db = setup_test_db().await;
        let service = CoursesService::new(db);

        let err = service
            .course_members(CourseId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, CoursesServiceError::CourseNotFound));
    }
}
