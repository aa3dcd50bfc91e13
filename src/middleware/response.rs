use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds the success envelope:
/// `{"data": {"status": {"code", "pesan"}, "results": ...}}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub results: Option<T>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(message: impl Into<String>, results: T) -> Self {
        Self {
            message: message.into(),
            results: Some(results),
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(message: impl Into<String>, results: T, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            results: Some(results),
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(message: impl Into<String>, results: T) -> Self {
        Self::with_status(message, results, StatusCode::CREATED)
    }
}

impl ApiResponse<()> {
    /// A 200 response whose `results` is `null`
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            results: None,
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let results = match self.results.as_ref().map(serde_json::to_value).transpose() {
            Ok(value) => value.unwrap_or(Value::Null),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                return (
                    status,
                    Json(json!({
                        "data": {
                            "status": {
                                "code": status.as_u16(),
                                "pesan": "Failed to serialize response data",
                            }
                        }
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "data": {
                "status": {
                    "code": status.as_u16(),
                    "pesan": self.message,
                },
                "results": results,
            }
        });

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope() {
        let response = ApiResponse::created("Admin created successfully", json!({"ID": "x"}))
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["data"]["status"]["code"], 201);
        assert_eq!(body["data"]["status"]["pesan"], "Admin created successfully");
        assert_eq!(body["data"]["results"]["ID"], "x");
    }

    #[tokio::test]
    async fn message_only_has_null_results() {
        let body = body_json(ApiResponse::message("Student deleted successfully").into_response()).await;
        assert_eq!(body["data"]["status"]["code"], 200);
        assert!(body["data"]["results"].is_null());
    }
}
