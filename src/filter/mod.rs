pub mod error;
pub mod pagination;
pub mod student;
pub mod study_program;

pub use error::FilterError;
pub use pagination::{Page, Paged};
pub use student::StudentFilter;
pub use study_program::StudyProgramFilter;

use bson::{doc, Bson, Document, Regex};

/// Case-insensitive substring match on user input, which is treated literally.
pub(crate) fn contains_ci(needle: &str) -> Document {
    doc! {
        "$regex": Bson::RegularExpression(Regex {
            pattern: regex::escape(needle),
            options: "i".to_string(),
        })
    }
}

/// Case-insensitive whole-value match.
pub(crate) fn equals_ci(value: &str) -> Bson {
    Bson::RegularExpression(Regex {
        pattern: format!("^{}$", regex::escape(value)),
        options: "i".to_string(),
    })
}

pub(crate) fn text_contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Blank strings are treated as absent filter values.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
