pub mod admin_service;
pub mod image_service;
pub mod import_service;
pub mod knowledge_service;
pub mod student_service;
pub mod study_program_service;
pub mod university_service;

pub use admin_service::{AdminService, AuthContext, AuthPolicy, NewAdmin, Session};
pub use image_service::ImageService;
pub use import_service::ImportService;
pub use knowledge_service::KnowledgeService;
pub use student_service::StudentService;
pub use study_program_service::{StudyProgramService, StudyProgramWithUniversity};
pub use university_service::UniversityService;

use bson::oid::ObjectId;
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::import::SheetError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the domain services. Mapped onto HTTP statuses at the
/// request boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] std::io::Error),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        ServiceError::Duplicate(message.into())
    }
}

/// A unique-index rejection is the same conflict the service checks for up
/// front, reached by a concurrent writer.
impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateKey(_) => ServiceError::duplicate("record already exists"),
            other => ServiceError::Database(other),
        }
    }
}

impl From<FilterError> for ServiceError {
    fn from(err: FilterError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Task(err.to_string())
    }
}

/// Parse a 24-character hex object id supplied by a client.
pub fn parse_id(value: &str) -> ServiceResult<ObjectId> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| ServiceError::validation(format!("invalid id: {}", value)))
}

/// Map a unique-index rejection on insert to the same Duplicate error the
/// up-front check returns.
pub(crate) fn on_conflict(message: &'static str) -> impl FnOnce(DatabaseError) -> ServiceError {
    move |err| match err {
        DatabaseError::DuplicateKey(_) => ServiceError::duplicate(message),
        other => other.into(),
    }
}

/// A store write that matched nothing means the target record is missing.
pub(crate) fn found(matched: bool, what: &str) -> ServiceResult<()> {
    if matched {
        Ok(())
    } else {
        Err(ServiceError::not_found(format!("{} not found", what)))
    }
}
