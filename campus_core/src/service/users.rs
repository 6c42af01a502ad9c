use std::fmt::Write as _;

use rand::distr::{Alphanumeric, SampleString};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{entity::prelude::*, error::ServiceError, ids::UserId};

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("fatal database error")]
    DbError(#[from] DbErr),

    #[error("empty {0}")]
    MissingField(&'static str),

    #[error("malformed email address")]
    MalformedEmail,

    #[error("a user with this id already exists")]
    UserIdTaken,

    #[error("a user with this email already exists")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,
}

impl From<UsersServiceError> for ServiceError {
    fn from(error: UsersServiceError) -> Self {
        match error {
            UsersServiceError::DbError(error) => ServiceError::infra(error),
            UsersServiceError::MissingField(_) => ServiceError::validation(error),
            UsersServiceError::MalformedEmail => ServiceError::validation(error),
            UsersServiceError::UserIdTaken => ServiceError::validation(error),
            UsersServiceError::EmailTaken => ServiceError::validation(error),
            // 401 at the HTTP layer; still a no-state-change rejection here
            UsersServiceError::InvalidCredentials => ServiceError::validation(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub account_type: AccountType,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentView {
    pub student_id: UserId,
    pub name: String,
    pub email: String,
}

// The reference system stored plaintext passwords. Not reproduced: we keep
// a per-user random salt and a SHA-256 digest, nothing recoverable.
fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

#[derive(Clone)]
pub struct UsersService {
    db: DatabaseConnection,
}

impl UsersService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Register a new account. Ids come from the campus registry, so the
    /// caller supplies them.
    pub async fn register(&self, new_user: NewUser) -> Result<UserModel, UsersServiceError> {
        if new_user.name.trim().is_empty() {
            return Err(UsersServiceError::MissingField("name"));
        }
        if new_user.password.is_empty() {
            return Err(UsersServiceError::MissingField("password"));
        }
        if new_user.email.trim().is_empty() {
            return Err(UsersServiceError::MissingField("email"));
        }
        if !new_user.email.contains('@') {
            return Err(UsersServiceError::MalformedEmail);
        }

        let id_taken = User::find_by_id(new_user.id).one(&self.db).await?.is_some();
        if id_taken {
            return Err(UsersServiceError::UserIdTaken);
        }

        let email_taken = User::find()
            .filter(UserColumn::Email.eq(new_user.email.clone()))
            .one(&self.db)
            .await?
            .is_some();
        if email_taken {
            return Err(UsersServiceError::EmailTaken);
        }

        let salt = Alphanumeric.sample_string(&mut rand::rng(), 16);
        let hashed = hash_password(&new_user.password, &salt);

        let user = UserActiveModel {
            id: Set(new_user.id),
            name: Set(new_user.name),
            account_type: Set(new_user.account_type),
            email: Set(new_user.email),
            password_salt: Set(salt),
            password_hash: Set(hashed),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = User::insert(user).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    /// Check credentials and return the account. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserModel, UsersServiceError> {
        if email.is_empty() || password.is_empty() {
            return Err(UsersServiceError::MissingField("email or password"));
        }

        let user = User::find()
            .filter(UserColumn::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(UsersServiceError::InvalidCredentials)?;

        if hash_password(password, &user.password_salt) != user.password_hash {
            return Err(UsersServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<UserModel>, UsersServiceError> {
        Ok(User::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn list_students(&self) -> Result<Vec<StudentView>, UsersServiceError> {
        let students = User::find()
            .filter(UserColumn::AccountType.eq(AccountType::Student))
            .order_by_asc(UserColumn::Id)
            .all(&self.db)
            .await?;

        Ok(students
            .into_iter()
            .map(|u| StudentView {
                student_id: u.id,
                name: u.name,
                email: u.email,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::setup_test_db;

    fn new_user(id: i64, email: &str, account_type: AccountType) -> NewUser {
        NewUser {
            id: UserId::new(id),
            name: format!("User {id}"),
            account_type,
            email: email.to_string(),
            password: "hunter2hunter2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let db = setup_test_db().await;
        let service = UsersService::new(db);

        let user = service
            .register(new_user(1, "a@campus.edu", AccountType::Student))
            .await
            .unwrap();

        assert_ne!(user.password_hash, "hunter2hunter2");
        assert_eq!(user.password_salt.len(), 16);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let db = setup_test_db().await;
        let service = UsersService::new(db);

        service
            .register(new_user(1, "a@campus.edu", AccountType::Student))
            .await
            .unwrap();

        let err = service
            .register(new_user(1, "b@campus.edu", AccountType::Student))
            .await
            .unwrap_err();
        assert!(matches!(err, UsersServiceError::UserIdTaken));

        let err = service
            .register(new_user(2, "a@campus.edu", AccountType::Student))
            .await
            .unwrap_err();
        assert!(matches!(err, UsersServiceError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let db = setup_test_db().await;
        let service = UsersService::new(db);

        let mut missing_name = new_user(1, "a@campus.edu", AccountType::Student);
        missing_name.name = " ".to_string();
        let err = service.register(missing_name).await.unwrap_err();
        assert_eq!(ServiceError::from(err).kind(), ErrorKind::Validation);

        let bad_email = new_user(1, "not-an-email", AccountType::Student);
        let err = service.register(bad_email).await.unwrap_err();
        assert!(matches!(err, UsersServiceError::MalformedEmail));
    }

    #[tokio::test]
    async fn test_login_roundtrip() {
        let db = setup_test_db().await;
        let service = UsersService::new(db);

        service
            .register(new_user(1, "a@campus.edu", AccountType::Lecturer))
            .await
            .unwrap();

        let user = service
            .login("a@campus.edu", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.account_type, AccountType::Lecturer);

        let err = service
            .login("a@campus.edu", "wrong password")
            .await
            .unwrap_err();
        assert!(matches!(err, UsersServiceError::InvalidCredentials));

        let err = service
            .login("nobody@campus.edu", "hunter2hunter2")
            .await
            .unwrap_err();
        assert!(matches!(err, UsersServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_list_students_excludes_staff() {
        let db = setup_test_db().await;
        let service = UsersService::new(db);

        service
            .register(new_user(1, "s@campus.edu", AccountType::Student))
            .await
            .unwrap();
        service
            .register(new_user(2, "l@campus.edu", AccountType::Lecturer))
            .await
            .unwrap();
        service
            .register(new_user(3, "a@campus.edu", AccountType::Admin))
            .await
            .unwrap();

        let students = service.list_students().await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].student_id, UserId::new(1));
    }
}
