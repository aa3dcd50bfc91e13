use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyProgram {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub program_details: ProgramDetails,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<ObjectId>,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub program_type: String,
    #[serde(default)]
    pub ukt: String,
    #[serde(default)]
    pub spi: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub is_packet_c: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub advantages: String,
    #[serde(default)]
    pub disadvantages: String,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub registration: DateRange,
    #[serde(default)]
    pub exam: DateRange,
    #[serde(default, with = "bson_datetime")]
    pub announcement: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, with = "bson_datetime")]
    pub start: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub end: DateTime<Utc>,
}

impl Default for ProgramDetails {
    fn default() -> Self {
        Self {
            university: None,
            program: String::new(),
            program_type: String::new(),
            ukt: String::new(),
            spi: String::new(),
            capacity: String::new(),
            is_packet_c: false,
            description: String::new(),
            advantages: String::new(),
            disadvantages: String::new(),
            articles: Vec::new(),
            requirements: Vec::new(),
            registration: DateRange::default(),
            exam: DateRange::default(),
            announcement: DateTime::<Utc>::default(),
        }
    }
}

/// Partial update. A present `program_details` replaces the whole sub-document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudyProgramPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_details: Option<ProgramDetails>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StudyProgram {
    pub fn new(name: impl Into<String>, program_details: ProgramDetails, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            program_details,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &StudyProgramPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(details) = &patch.program_details {
            self.program_details = details.clone();
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = at;
        }
    }
}
