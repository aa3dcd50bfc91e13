use bson::{doc, oid::ObjectId, Document};

use super::{contains_ci, present, text_contains_ci, FilterError};
use crate::database::models::StudyProgram;

/// Listing filter for the study programs of one knowledge program.
#[derive(Debug, Clone, Default)]
pub struct StudyProgramFilter {
    pub kb_year: String,
    pub kp_name: String,
    pub search_query: Option<String>,
    pub program_type: Option<String>,
    pub program: Option<String>,
}

impl StudyProgramFilter {
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.kb_year.trim().is_empty() {
            return Err(FilterError::MissingField("kbYear"));
        }
        if self.kp_name.trim().is_empty() {
            return Err(FilterError::MissingField("kpName"));
        }
        Ok(())
    }

    /// Restrict to `ids`, then apply the optional text filters.
    pub fn to_document(&self, ids: &[ObjectId]) -> Document {
        let mut filter = doc! { "_id": { "$in": ids.to_vec() } };
        if let Some(v) = present(&self.search_query) {
            filter.insert("name", contains_ci(v));
        }
        if let Some(v) = present(&self.program_type) {
            filter.insert("program_details.program_type", contains_ci(v));
        }
        if let Some(v) = present(&self.program) {
            filter.insert("program_details.program", contains_ci(v));
        }
        filter
    }

    pub fn matches(&self, program: &StudyProgram) -> bool {
        let details = &program.program_details;
        present(&self.search_query).map_or(true, |v| text_contains_ci(&program.name, v))
            && present(&self.program_type).map_or(true, |v| text_contains_ci(&details.program_type, v))
            && present(&self.program).map_or(true, |v| text_contains_ci(&details.program, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_year_and_program_name() {
        let filter = StudyProgramFilter::default();
        assert_eq!(filter.validate(), Err(FilterError::MissingField("kbYear")));

        let filter = StudyProgramFilter { kb_year: "2024".into(), ..Default::default() };
        assert_eq!(filter.validate(), Err(FilterError::MissingField("kpName")));
    }

    #[test]
    fn document_restricts_ids_and_adds_regexes() {
        let id = ObjectId::new();
        let filter = StudyProgramFilter {
            kb_year: "2024".into(),
            kp_name: "saintek".into(),
            search_query: Some("kedokteran".into()),
            program_type: None,
            program: Some("S1".into()),
        };
        let doc = filter.to_document(&[id]);
        assert_eq!(doc.get_document("_id").unwrap().get_array("$in").unwrap().len(), 1);
        assert!(doc.contains_key("name"));
        assert!(doc.contains_key("program_details.program"));
        assert!(!doc.contains_key("program_details.program_type"));
    }
}
