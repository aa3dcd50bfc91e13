use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::{on_conflict, ServiceError, ServiceResult};
use crate::auth::{hash_password, verify_password, Claims, TokenError, TokenIssuer};
use crate::database::models::{Admin, TokenRecord};
use crate::database::SharedStore;

/// Which token checks a route runs before its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Verify the signature and `exp` with the server secret.
    pub local: bool,
    /// Require a stored, unexpired token record and resolve its admin.
    pub database: bool,
}

impl AuthPolicy {
    pub const PUBLIC: AuthPolicy = AuthPolicy { local: false, database: false };
    pub const LOCAL: AuthPolicy = AuthPolicy { local: true, database: false };
    pub const DATABASE: AuthPolicy = AuthPolicy { local: false, database: true };
    pub const BOTH: AuthPolicy = AuthPolicy { local: true, database: true };
}

/// Result of a successful authentication, attached to the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub token: String,
    /// Present when local validation ran.
    pub claims: Option<Claims>,
    /// Present when database validation ran.
    pub admin: Option<Admin>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
    pub full_name: String,
}

/// An admin together with the bearer token that identifies the session.
#[derive(Debug, Clone)]
pub struct Session {
    pub admin: Admin,
    pub token: String,
}

pub struct AdminService {
    store: SharedStore,
    issuer: TokenIssuer,
    bcrypt_cost: u32,
}

impl AdminService {
    pub fn new(store: SharedStore, issuer: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self { store, issuer, bcrypt_cost }
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub async fn register(&self, input: NewAdmin) -> ServiceResult<Admin> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(ServiceError::validation("username is required"));
        }
        if input.password.is_empty() {
            return Err(ServiceError::validation("password is required"));
        }
        if self.store.find_admin_by_username(&username).await?.is_some() {
            return Err(ServiceError::duplicate("admin already exists"));
        }

        let cost = self.bcrypt_cost;
        let password = input.password;
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

        let admin = Admin {
            id: ObjectId::new(),
            username,
            password: hash,
            email: input.email,
            full_name: input.full_name,
        };
        self.store
            .insert_admin(&admin)
            .await
            .map_err(on_conflict("admin already exists"))?;

        info!("Created admin {}", admin.username);
        Ok(admin)
    }

    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<Session> {
        let admin = self
            .store
            .find_admin_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("admin not found"))?;

        let candidate = password.to_string();
        let hash = admin.password.clone();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&candidate, &hash)).await?;
        match matches {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::InvalidCredentials),
            Err(e) => {
                // A malformed stored hash cannot match anything
                warn!("Stored password hash for {} is unusable: {}", admin.username, e);
                return Err(ServiceError::InvalidCredentials);
            }
        }

        let access_uuid = admin.id.to_hex();
        let issued = self.issuer.issue(&access_uuid)?;
        let record = TokenRecord {
            id: ObjectId::new(),
            access_token: issued.token.clone(),
            access_uuid,
            at_expires: issued.expires_at.timestamp(),
            created_at: Utc::now(),
        };
        self.store.replace_token(&record).await?;

        info!("Admin {} logged in", admin.username);
        Ok(Session { admin, token: issued.token })
    }

    /// Signature and expiry check only. No database access.
    pub fn authenticate_local(&self, token: &str) -> ServiceResult<Claims> {
        self.issuer.verify(token).map_err(|e| match e {
            TokenError::Expired => ServiceError::Unauthorized("Token has expired".to_string()),
            other => ServiceError::Unauthorized(other.to_string()),
        })
    }

    /// Resolve the admin that owns a stored token.
    pub async fn authenticate_stored(&self, token: &str) -> ServiceResult<Admin> {
        let record = self
            .store
            .find_token(token)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("token not found".to_string()))?;
        if record.is_expired_at(Utc::now()) {
            debug!("Stored token for {} has expired", record.access_uuid);
            return Err(ServiceError::Unauthorized("Token has expired".to_string()));
        }

        let admin_id = ObjectId::parse_str(&record.access_uuid)
            .map_err(|_| ServiceError::Unauthorized("token owner is invalid".to_string()))?;
        self.store
            .find_admin(&admin_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("admin not found".to_string()))
    }

    /// Run the checks `policy` asks for. Each enabled mode must pass.
    pub async fn authenticate(&self, token: &str, policy: AuthPolicy) -> ServiceResult<AuthContext> {
        let claims = if policy.local {
            Some(self.authenticate_local(token)?)
        } else {
            None
        };
        let admin = if policy.database {
            Some(self.authenticate_stored(token).await?)
        } else {
            None
        };
        Ok(AuthContext { token: token.to_string(), claims, admin })
    }

    pub async fn profile(&self, token: &str) -> ServiceResult<Session> {
        let admin = self.authenticate_stored(token).await?;
        Ok(Session { admin, token: token.to_string() })
    }

    /// Drop the stored token so database-mode checks fail from now on.
    pub async fn logout(&self, admin: &Admin) -> ServiceResult<()> {
        let removed = self.store.delete_token(&admin.id.to_hex()).await?;
        info!("Admin {} logged out ({} token removed)", admin.username, removed);
        Ok(())
    }
}
