//! Spreadsheet parsing for the bulk import routines. Reading cells is kept
//! apart from the upsert logic in `services::import_service`.

pub mod rows;
pub mod sheet;
pub mod stats;

pub use rows::{ProgramRow, StudentRow};
pub use sheet::{cell, parse_date, read_upload, read_workbook, SheetError, SheetRows};
pub use stats::{ImportResult, OperationStats, StudentImportResult, Upsert};
