use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Missing filter field: {0}")]
    MissingField(&'static str),

    #[error("Invalid filter value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
