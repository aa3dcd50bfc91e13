use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub school_logo: String,
    #[serde(default)]
    pub school_image: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchoolPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl School {
    pub fn named(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            address: String::new(),
            province: String::new(),
            city: String::new(),
            school_logo: String::new(),
            school_image: String::new(),
            phone: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &SchoolPatch) {
        if let Some(v) = &patch.address {
            self.address = v.clone();
        }
        if let Some(v) = &patch.province {
            self.province = v.clone();
        }
        if let Some(v) = &patch.city {
            self.city = v.clone();
        }
        if let Some(v) = &patch.school_logo {
            self.school_logo = v.clone();
        }
        if let Some(v) = &patch.school_image {
            self.school_image = v.clone();
        }
        if let Some(v) = &patch.phone {
            self.phone = v.clone();
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = at;
        }
    }
}
