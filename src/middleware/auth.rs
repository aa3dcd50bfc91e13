use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::services::{AdminService, AuthPolicy};

/// Route-level auth configuration handed to [`auth_middleware`].
#[derive(Clone)]
pub struct AuthGate {
    pub admins: Arc<AdminService>,
    pub policy: AuthPolicy,
}

impl AuthGate {
    pub fn new(admins: Arc<AdminService>, policy: AuthPolicy) -> Self {
        Self { admins, policy }
    }
}

/// Bearer authentication. On success the request carries an
/// [`AuthContext`](crate::services::AuthContext) extension.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let context = gate
        .admins
        .authenticate(&token, gate.policy)
        .await
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            ApiError::unauthorized(e.to_string())
        })?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// `Authorization: Bearer <token>`, scheme case-insensitive, exactly two parts.
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("No Authorization header provided"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    let parts: Vec<&str> = auth_str.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token.to_string())
        }
        _ => Err(ApiError::unauthorized("Invalid Authorization header format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_any_scheme_case() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn rejects_malformed_headers() {
        for value in ["abc", "Basic abc", "Bearer a b", "Bearer "] {
            let err = extract_bearer_token(&headers(value)).unwrap_err();
            assert_eq!(err.status_code(), 401);
            assert_eq!(err.message(), "Invalid Authorization header format");
        }
    }

    #[test]
    fn missing_header() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.message(), "No Authorization header provided");
    }
}
