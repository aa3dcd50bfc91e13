use bson::{doc, Document};
use serde::Deserialize;

use super::{contains_ci, present, text_contains_ci};
use crate::database::models::Student;

/// Listing filter for students. Every field is optional; blank strings are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudentFilter {
    pub name: Option<String>,
    pub school: Option<String>,
    pub interest: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
    pub financial_ability: Option<String>,
    pub progress: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    /// Full-text search over the student text index.
    pub search: Option<String>,
}

impl StudentFilter {
    fn substring_fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("name", present(&self.name)),
            ("school", present(&self.school)),
            ("phone", present(&self.phone)),
            ("birthdate", present(&self.birthdate)),
        ]
    }

    fn exact_fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("interest", present(&self.interest)),
            ("gender", present(&self.gender)),
            ("financial_ability", present(&self.financial_ability)),
            ("progress", present(&self.progress)),
            ("category", present(&self.category)),
        ]
    }

    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        for (field, value) in self.substring_fields() {
            if let Some(v) = value {
                filter.insert(field, contains_ci(v));
            }
        }
        for (field, value) in self.exact_fields() {
            if let Some(v) = value {
                filter.insert(field, v);
            }
        }
        if let Some(active) = self.is_active {
            filter.insert("is_active", active);
        }
        if let Some(search) = present(&self.search) {
            filter.insert("$text", doc! { "$search": search });
        }

        filter
    }

    pub fn matches(&self, student: &Student) -> bool {
        let field = |name: &str| field_value(student, name);
        let substrings_ok = self
            .substring_fields()
            .iter()
            .all(|(name, value)| value.map_or(true, |v| text_contains_ci(field(*name), v)));
        let exact_ok = self
            .exact_fields()
            .iter()
            .all(|(name, value)| value.map_or(true, |v| field(*name) == v));
        let active_ok = self.is_active.map_or(true, |a| student.is_active == a);
        let search_ok = present(&self.search).map_or(true, |terms| {
            let indexed = [
                &student.name,
                &student.email,
                &student.school,
                &student.interest,
                &student.phone,
                &student.category,
            ];
            terms
                .split_whitespace()
                .any(|term| indexed.iter().any(|text| text_contains_ci(text, term)))
        });

        substrings_ok && exact_ok && active_ok && search_ok
    }
}

fn field_value<'a>(student: &'a Student, name: &str) -> &'a str {
    match name {
        "name" => &student.name,
        "school" => &student.school,
        "phone" => &student.phone,
        "birthdate" => &student.birthdate,
        "interest" => &student.interest,
        "gender" => &student.gender,
        "financial_ability" => &student.financial_ability,
        "progress" => &student.progress,
        "category" => &student.category,
        _ => "",
    }
}
