use serde::Serialize;

/// Outcome counters for one entity kind during an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub created_count: u64,
    pub updated_count: u64,
    pub failed_count: u64,
    /// 1-based row numbers as shown by spreadsheet software.
    pub failed_rows: Vec<usize>,
}

impl OperationStats {
    pub fn record_created(&mut self) {
        self.created_count += 1;
    }

    pub fn record_updated(&mut self) {
        self.updated_count += 1;
    }

    pub fn record_failed(&mut self, row_number: usize) {
        self.failed_count += 1;
        self.failed_rows.push(row_number);
    }

    pub fn record(&mut self, outcome: Upsert) {
        match outcome {
            Upsert::Created => self.record_created(),
            Upsert::Updated => self.record_updated(),
        }
    }

    pub fn total(&self) -> u64 {
        self.created_count + self.updated_count + self.failed_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub university_stats: OperationStats,
    pub program_stats: OperationStats,
    /// 1-based numbers of rows with no content. These are not attempted and
    /// do not appear in any counter.
    pub skipped_rows: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentImportResult {
    pub school_stats: OperationStats,
    pub student_stats: OperationStats,
    /// Blank rows, numbered as in [`ImportResult::skipped_rows`].
    pub skipped_rows: Vec<usize>,
}
