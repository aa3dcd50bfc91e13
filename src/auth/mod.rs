pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

pub use password::{hash_password, verify_password, PasswordError};

/// Claims carried by an admin access token. `access_uuid` is the admin id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub authorized: bool,
    pub access_uuid: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(access_uuid: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            authorized: true,
            access_uuid: access_uuid.into(),
            exp: expires_at.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token is not authorized")]
    NotAuthorized,
}

/// A freshly minted token together with its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies HS256 access tokens with the configured secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.token_ttl_minutes)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, access_uuid: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(access_uuid, Utc::now())
    }

    pub fn issue_at(&self, access_uuid: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims::new(access_uuid, expires_at);

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry. No leeway is granted on `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if !data.claims.authorized {
            return Err(TokenError::NotAuthorized);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_before_expiry() {
        let issuer = TokenIssuer::new("secret", 15);
        let issued = issuer.issue("65a000000000000000000001").unwrap();

        let claims = issuer.verify(&issued.token).unwrap();
        assert!(claims.authorized);
        assert_eq!(claims.access_uuid, "65a000000000000000000001");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret", 15);
        let issued = issuer
            .issue_at("65a000000000000000000001", Utc::now() - Duration::minutes(16))
            .unwrap();

        assert!(matches!(issuer.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = TokenIssuer::new("one", 15).issue("abc").unwrap();
        let result = TokenIssuer::new("two", 15).verify(&issued.token);
        assert!(matches!(result, Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let issuer = TokenIssuer::new("secret", 15);
        assert!(matches!(issuer.verify("not.a.token"), Err(TokenError::Invalid(_))));
    }
}
