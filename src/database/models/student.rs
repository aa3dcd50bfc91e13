use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub school: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_id: Option<ObjectId>,
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub financial_ability: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub detailsiswa_link: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub birthdate: String,
    #[serde(default)]
    pub track_records: Vec<TrackRecord>,
    #[serde(default)]
    pub track_lobby: Vec<TrackLobby>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// A paid service sold to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub service_name: String,
    #[serde(default)]
    pub service_date: String,
    #[serde(default)]
    pub service_cost: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewTrackRecord {
    pub service_name: String,
    pub service_date: String,
    pub service_cost: String,
    pub status: String,
}

impl TrackRecord {
    pub fn new(fields: NewTrackRecord, now: DateTime<Utc>) -> Self {
        Self {
            service_name: fields.service_name,
            service_date: fields.service_date,
            service_cost: fields.service_cost,
            status: fields.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields, keeping the original creation time.
    pub fn revised(&self, fields: NewTrackRecord, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            ..Self::new(fields, now)
        }
    }
}

/// One entry in a student's progress history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLobby {
    pub progress: String,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TrackLobby {
    pub fn new(progress: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            progress: progress.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_ability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailsiswa_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Build a new active student from the fields of a patch.
    pub fn from_patch(patch: StudentPatch, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            name: patch.name.unwrap_or_default(),
            email: patch.email.unwrap_or_default(),
            school: patch.school.unwrap_or_default(),
            school_id: patch.school_id,
            interest: patch.interest.unwrap_or_default(),
            gender: patch.gender.unwrap_or_default(),
            phone: patch.phone.unwrap_or_default(),
            financial_ability: patch.financial_ability.unwrap_or_default(),
            progress: patch.progress.unwrap_or_default(),
            detailsiswa_link: patch.detailsiswa_link.unwrap_or_default(),
            image: patch.image.unwrap_or_default(),
            category: patch.category.unwrap_or_default(),
            birthdate: patch.birthdate.unwrap_or_default(),
            track_records: Vec::new(),
            track_lobby: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &StudentPatch) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut self.name, &patch.name);
        set(&mut self.email, &patch.email);
        set(&mut self.school, &patch.school);
        if patch.school_id.is_some() {
            self.school_id = patch.school_id;
        }
        set(&mut self.interest, &patch.interest);
        set(&mut self.gender, &patch.gender);
        set(&mut self.phone, &patch.phone);
        set(&mut self.financial_ability, &patch.financial_ability);
        set(&mut self.progress, &patch.progress);
        set(&mut self.detailsiswa_link, &patch.detailsiswa_link);
        set(&mut self.image, &patch.image);
        set(&mut self.category, &patch.category);
        set(&mut self.birthdate, &patch.birthdate);
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = at;
        }
    }

    pub fn has_service(&self, service_name: &str) -> bool {
        self.track_records.iter().any(|r| r.service_name == service_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_leaves_unset_fields() {
        let now = Utc::now();
        let mut student = Student::from_patch(
            StudentPatch {
                name: Some("Ayu".into()),
                phone: Some("0812".into()),
                ..Default::default()
            },
            now,
        );
        assert!(student.is_active);

        student.apply(&StudentPatch {
            progress: Some("interview".into()),
            is_active: Some(false),
            ..Default::default()
        });

        assert_eq!(student.name, "Ayu");
        assert_eq!(student.phone, "0812");
        assert_eq!(student.progress, "interview");
        assert!(!student.is_active);
    }

    #[test]
    fn revised_record_keeps_creation_time() {
        let created = Utc::now() - chrono::Duration::days(2);
        let original = TrackRecord::new(
            NewTrackRecord { service_name: "tryout".into(), ..Default::default() },
            created,
        );
        let revised = original.revised(
            NewTrackRecord { service_name: "tryout".into(), status: "paid".into(), ..Default::default() },
            Utc::now(),
        );
        assert_eq!(revised.created_at, created);
        assert_eq!(revised.status, "paid");
    }
}
