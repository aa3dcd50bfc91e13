use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    /// bcrypt hash, never the plaintext
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
}

/// Persisted access token. At most one live record exists per `access_uuid`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub access_token: String,
    pub access_uuid: String,
    /// Unix seconds
    pub at_expires: i64,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.at_expires <= now.timestamp()
    }
}
