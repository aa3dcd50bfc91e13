use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime as bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A yearly catalog of named program groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub year: String,
    #[serde(default)]
    pub programs: Vec<KnowledgeProgram>,
    #[serde(default, with = "bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeProgram {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    /// Ordered references into the study program collection.
    #[serde(default)]
    pub study_programs: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeBasePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub programs: Option<Vec<KnowledgeProgram>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl KnowledgeBase {
    pub fn new(year: impl Into<String>, programs: Vec<KnowledgeProgram>, now: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            year: year.into(),
            programs,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn program(&self, name: &str) -> Option<&KnowledgeProgram> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn program_mut(&mut self, name: &str) -> Option<&mut KnowledgeProgram> {
        self.programs.iter_mut().find(|p| p.name == name)
    }

    pub fn apply(&mut self, patch: &KnowledgeBasePatch) {
        if let Some(year) = &patch.year {
            self.year = year.clone();
        }
        if let Some(programs) = &patch.programs {
            self.programs = programs.clone();
        }
        if let Some(at) = patch.updated_at {
            self.updated_at = at;
        }
    }
}

impl KnowledgeProgram {
    /// Append `id` unless it is already referenced. Returns whether it was added.
    pub fn link(&mut self, id: ObjectId) -> bool {
        if self.study_programs.contains(&id) {
            return false;
        }
        self.study_programs.push(id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linking_twice_keeps_one_reference() {
        let mut program = KnowledgeProgram { name: "saintek".into(), ..Default::default() };
        let id = ObjectId::new();
        assert!(program.link(id));
        assert!(!program.link(id));
        assert_eq!(program.study_programs, vec![id]);
    }
}
