// Request-level errors and their JSON envelope
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::ServiceError;

/// Every handler failure ends up as one of these. The message is what the
/// client sees, so infrastructure details are logged and replaced.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    InternalServerError(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Error envelope: `{"data": {"status": {"code", "pesan"}}}`
    pub fn to_json(&self) -> Value {
        json!({
            "data": {
                "status": {
                    "code": self.status_code().as_u16(),
                    "pesan": self.message(),
                }
            }
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Login reports a missing admin and a wrong password the same way.
    pub fn from_login(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::unauthorized(msg),
            ServiceError::InvalidCredentials => {
                ApiError::unauthorized(ServiceError::InvalidCredentials.to_string())
            }
            other => other.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::InvalidCredentials => {
                ApiError::unauthorized(ServiceError::InvalidCredentials.to_string())
            }
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Token(e) => ApiError::unauthorized(e.to_string()),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            // Duplicates surface as server errors for wire compatibility
            ServiceError::Duplicate(msg) => ApiError::internal_server_error(msg),
            ServiceError::Sheet(e) => ApiError::bad_request(e.to_string()),
            ServiceError::Database(e) => e.into(),
            ServiceError::Password(e) => {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ServiceError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                ApiError::internal_server_error("Failed to store file")
            }
            ServiceError::Task(msg) => {
                tracing::error!("Background task error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::DuplicateKey(msg) => {
                tracing::warn!("Duplicate key: {}", msg);
                ApiError::internal_server_error("record already exists")
            }
            DatabaseError::Mongo(e) => {
                tracing::error!("MongoDB error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        tracing::debug!("Responding {}: {}", status, self.message());
        (status, Json(self.to_json())).into_response()
    }
}
