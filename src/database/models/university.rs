use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub social_media: Vec<SocialMedia>,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub fax: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMedia {
    pub platform: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UniversityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<Vec<SocialMedia>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl University {
    pub fn from_patch(patch: UniversityPatch, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            name: patch.name.unwrap_or_default(),
            alias: patch.alias.unwrap_or_default(),
            address: patch.address.unwrap_or_default(),
            website: patch.website.unwrap_or_default(),
            logo: patch.logo.unwrap_or_default(),
            image: patch.image.unwrap_or_default(),
            contact: patch.contact.unwrap_or_default(),
            social_media: patch.social_media.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &UniversityPatch) {
        for (target, value) in [
            (&mut self.name, &patch.name),
            (&mut self.alias, &patch.alias),
            (&mut self.address, &patch.address),
            (&mut self.website, &patch.website),
            (&mut self.logo, &patch.logo),
            (&mut self.image, &patch.image),
        ] {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        if let Some(contact) = &patch.contact {
            self.contact = contact.clone();
        }
        if let Some(social) = &patch.social_media {
            self.social_media = social.clone();
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = at;
        }
    }
}
