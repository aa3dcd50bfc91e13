use std::io::Write;
use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Every row of the first worksheet as text, indexed from column A.
pub type SheetRows = Vec<Vec<String>>;

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Date layout used by the import sheets (`01-31-24`).
pub const DATE_LAYOUT: &str = "%m-%d-%y";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unsupported spreadsheet type: {0}")]
    Unsupported(String),

    #[error("spreadsheet has no worksheets")]
    NoWorksheet,

    #[error("cannot read spreadsheet: {0}")]
    Read(#[from] calamine::Error),

    #[error("cannot stage upload: {0}")]
    Io(#[from] std::io::Error),
}

fn extension(filename: &str) -> Result<String, SheetError> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| SheetError::Unsupported(filename.to_string()))
}

/// Read the first worksheet of a spreadsheet on disk.
pub fn read_workbook(path: &Path) -> Result<SheetRows, SheetError> {
    extension(&path.to_string_lossy())?;
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    // The range starts at the first used cell; pad so indexes match columns
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: SheetRows = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Stage uploaded bytes in a temporary file, read them, and remove the file.
/// The file is deleted on every path out of this function.
pub fn read_upload(
    filename: &str,
    bytes: &[u8],
    staging_dir: Option<&Path>,
) -> Result<SheetRows, SheetError> {
    let ext = extension(filename)?;
    let suffix = format!(".{}", ext);
    let mut builder = tempfile::Builder::new();
    builder.prefix("import-").suffix(&suffix);
    let mut staged = match staging_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            builder.tempfile_in(dir)?
        }
        None => builder.tempfile()?,
    };
    staged.write_all(bytes)?;
    staged.flush()?;

    read_workbook(staged.path())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format(DATE_LAYOUT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Cell `index` of `row`, or an empty string past the end of a short row.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Parse an `MM-DD-YY` date. Unparseable input becomes the Unix epoch.
pub fn parse_date(value: &str) -> DateTime<Utc> {
    match NaiveDate::parse_from_str(value.trim(), DATE_LAYOUT) {
        Ok(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        Err(e) => {
            if !value.trim().is_empty() {
                warn!("Unparseable import date {:?}: {}", value, e);
            }
            DateTime::<Utc>::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn parses_month_day_year() {
        let date = parse_date("01-31-24");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 31));
    }

    #[test]
    fn bad_dates_fall_back_to_epoch() {
        assert_eq!(parse_date("31-01-2024").timestamp(), 0);
        assert_eq!(parse_date("").timestamp(), 0);
    }

    #[test]
    fn short_rows_read_as_blank() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 5), "");
    }

    #[test]
    fn whole_floats_print_as_integers() {
        assert_eq!(cell_text(&Data::Float(81234.0)), "81234");
        assert_eq!(cell_text(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_text(&Data::String("  SMA 1 ".into())), "SMA 1");
    }

    #[test]
    fn rejects_unknown_extensions() {
        let result = read_upload("students.csv", b"a,b", None);
        assert!(matches!(result, Err(SheetError::Unsupported(_))));
    }

    #[test]
    fn garbage_upload_is_a_read_error() {
        let result = read_upload("students.xlsx", b"not a zip", None);
        assert!(matches!(result, Err(SheetError::Read(_))));
    }

    fn staged_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn staged_upload_is_removed_after_reading() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").unwrap();
        sheet.write_string(1, 0, "Ani").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();
        let staging = tempfile::tempdir().unwrap();

        let rows = read_upload("students.xlsx", &bytes, Some(staging.path())).unwrap();
        assert_eq!(rows[1][0], "Ani");
        assert_eq!(staged_files(staging.path()), 0);

        let result = read_upload("students.xlsx", b"not a zip", Some(staging.path()));
        assert!(matches!(result, Err(SheetError::Read(_))));
        assert_eq!(staged_files(staging.path()), 0);
    }
}
