use std::path::{Path, PathBuf};

use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{info, warn};

use super::study_program_service::StudyProgramService;
use super::{ServiceError, ServiceResult};
use crate::database::models::{School, Student, StudyProgram, StudyProgramPatch, University, UniversityPatch};
use crate::database::SharedStore;
use crate::import::{
    read_upload, read_workbook, ImportResult, OperationStats, ProgramRow, SheetRows,
    StudentImportResult, StudentRow, Upsert,
};

/// Row-by-row upserts from spreadsheets. Results are returned to the caller
/// only; a run is never persisted or retried.
pub struct ImportService {
    store: SharedStore,
    staging_dir: Option<PathBuf>,
}

impl ImportService {
    pub fn new(store: SharedStore, staging_dir: Option<PathBuf>) -> Self {
        Self { store, staging_dir }
    }

    /// Import universities and study programs, linking each program into the
    /// `kp_name` program of the `kb_year` catalog.
    pub async fn import_programs_upload(
        &self,
        kb_year: &str,
        kp_name: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<ImportResult> {
        self.require_catalog(kb_year, kp_name).await?;
        let rows = self.stage(filename, bytes).await?;
        self.import_program_rows(kb_year, kp_name, &rows).await
    }

    pub async fn import_programs_file(
        &self,
        kb_year: &str,
        kp_name: &str,
        path: &Path,
    ) -> ServiceResult<ImportResult> {
        self.require_catalog(kb_year, kp_name).await?;
        let rows = read_file(path).await?;
        self.import_program_rows(kb_year, kp_name, &rows).await
    }

    pub async fn import_students_upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ServiceResult<StudentImportResult> {
        let rows = self.stage(filename, bytes).await?;
        self.import_student_rows(&rows).await
    }

    pub async fn import_students_file(&self, path: &Path) -> ServiceResult<StudentImportResult> {
        let rows = read_file(path).await?;
        self.import_student_rows(&rows).await
    }

    async fn require_catalog(&self, kb_year: &str, kp_name: &str) -> ServiceResult<()> {
        if kb_year.trim().is_empty() || kp_name.trim().is_empty() {
            return Err(ServiceError::validation(
                "knowledgeBaseYear and knowledgeProgramName are required",
            ));
        }
        StudyProgramService::new(self.store.clone())
            .catalog_program(kb_year, kp_name)
            .await
            .map(|_| ())
    }

    async fn stage(&self, filename: &str, bytes: Vec<u8>) -> ServiceResult<SheetRows> {
        let filename = filename.to_string();
        let dir = self.staging_dir.clone();
        let rows = tokio::task::spawn_blocking(move || {
            read_upload(&filename, &bytes, dir.as_deref())
        })
        .await??;
        Ok(rows)
    }

    async fn import_program_rows(
        &self,
        kb_year: &str,
        kp_name: &str,
        rows: &SheetRows,
    ) -> ServiceResult<ImportResult> {
        let mut result = ImportResult {
            skipped_rows: blank_rows(rows),
            ..Default::default()
        };

        for (index, cells) in data_rows(rows) {
            let row_number = index + 1;
            let row = ProgramRow::from_cells(cells);

            let university_id = match self.upsert_university(&row).await {
                Ok((id, outcome)) => {
                    result.university_stats.record(outcome);
                    id
                }
                Err(e) => {
                    warn!("Row {}: university failed: {}", row_number, e);
                    result.university_stats.record_failed(row_number);
                    continue;
                }
            };

            let program_id = match self.upsert_program(&row, university_id).await {
                Ok((id, outcome)) => {
                    result.program_stats.record(outcome);
                    id
                }
                Err(e) => {
                    warn!("Row {}: study program failed: {}", row_number, e);
                    result.program_stats.record_failed(row_number);
                    continue;
                }
            };

            match self.store.link_study_program(kb_year, kp_name, &program_id).await {
                Ok(true) => {}
                Ok(false) => warn!("Row {}: catalog {}/{} disappeared", row_number, kb_year, kp_name),
                Err(e) => warn!("Row {}: linking study program failed: {}", row_number, e),
            }
        }

        log_stats("universities", &result.university_stats);
        log_stats("study programs", &result.program_stats);
        Ok(result)
    }

    async fn upsert_university(&self, row: &ProgramRow) -> ServiceResult<(ObjectId, Upsert)> {
        let name = row.university_name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("university name is blank"));
        }

        let now = Utc::now();
        match self.store.find_university_by_name(name).await? {
            Some(existing) => {
                let patch = UniversityPatch { updated_at: Some(now), ..row.university.clone() };
                self.store.update_university(&existing.id, &patch).await?;
                Ok((existing.id, Upsert::Updated))
            }
            None => {
                let patch = UniversityPatch { name: Some(name.to_string()), ..row.university.clone() };
                let university = University::from_patch(patch, now);
                self.store.insert_university(&university).await?;
                Ok((university.id, Upsert::Created))
            }
        }
    }

    async fn upsert_program(
        &self,
        row: &ProgramRow,
        university_id: ObjectId,
    ) -> ServiceResult<(ObjectId, Upsert)> {
        let name = row.program_name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("study program name is blank"));
        }

        let mut details = row.details.clone();
        details.university = Some(university_id);
        let now = Utc::now();

        let existing = self
            .store
            .find_study_program_by_key(name, &university_id, &details.program)
            .await?;
        match existing {
            Some(program) => {
                let patch = StudyProgramPatch {
                    name: None,
                    program_details: Some(details),
                    updated_at: Some(now),
                };
                self.store.update_study_program(&program.id, &patch).await?;
                Ok((program.id, Upsert::Updated))
            }
            None => {
                let program = StudyProgram::new(name, details, now);
                self.store.insert_study_program(&program).await?;
                Ok((program.id, Upsert::Created))
            }
        }
    }

    async fn import_student_rows(&self, rows: &SheetRows) -> ServiceResult<StudentImportResult> {
        let mut result = StudentImportResult {
            skipped_rows: blank_rows(rows),
            ..Default::default()
        };

        for (index, cells) in data_rows(rows) {
            let row_number = index + 1;
            let row = StudentRow::from_cells(cells);

            let school_id = match self.upsert_school(&row).await {
                Ok((id, outcome)) => {
                    result.school_stats.record(outcome);
                    id
                }
                Err(e) => {
                    warn!("Row {}: school failed: {}", row_number, e);
                    result.school_stats.record_failed(row_number);
                    continue;
                }
            };

            match self.upsert_student(&row, school_id).await {
                Ok((_, outcome)) => result.student_stats.record(outcome),
                Err(e) => {
                    warn!("Row {}: student failed: {}", row_number, e);
                    result.student_stats.record_failed(row_number);
                }
            }
        }

        log_stats("schools", &result.school_stats);
        log_stats("students", &result.student_stats);
        Ok(result)
    }

    async fn upsert_school(&self, row: &StudentRow) -> ServiceResult<(ObjectId, Upsert)> {
        let name = row.school_name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("school name is blank"));
        }

        let now = Utc::now();
        match self.store.find_school_by_name(name).await? {
            Some(existing) => {
                let mut patch = row.school.clone();
                patch.updated_at = Some(now);
                self.store.update_school(&existing.id, &patch).await?;
                Ok((existing.id, Upsert::Updated))
            }
            None => {
                let mut school = School::named(name, now);
                school.apply(&row.school);
                self.store.insert_school(&school).await?;
                Ok((school.id, Upsert::Created))
            }
        }
    }

    async fn upsert_student(&self, row: &StudentRow, school_id: ObjectId) -> ServiceResult<(ObjectId, Upsert)> {
        let name = row.student_name().trim();
        if name.is_empty() {
            return Err(ServiceError::validation("student name is blank"));
        }

        let mut patch = row.student.clone();
        patch.school_id = Some(school_id);
        let school = patch.school.clone().unwrap_or_default();
        let now = Utc::now();

        let existing = self
            .store
            .find_student_by_key(name, &school, row.student_phone())
            .await?;
        match existing {
            Some(student) => {
                patch.updated_at = Some(now);
                self.store.update_student(&student.id, &patch).await?;
                Ok((student.id, Upsert::Updated))
            }
            None => {
                patch.name = Some(name.to_string());
                let student = Student::from_patch(patch, now);
                self.store.insert_student(&student).await?;
                Ok((student.id, Upsert::Created))
            }
        }
    }
}

async fn read_file(path: &Path) -> ServiceResult<SheetRows> {
    let path = path.to_path_buf();
    Ok(tokio::task::spawn_blocking(move || read_workbook(&path)).await??)
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(String::is_empty)
}

/// Data rows with their 0-based sheet index. The header row and blank rows
/// are skipped; blank rows are reported through [`blank_rows`].
fn data_rows(rows: &SheetRows) -> impl Iterator<Item = (usize, &Vec<String>)> {
    rows.iter().enumerate().skip(1).filter(|(_, cells)| !is_blank(cells))
}

/// 1-based row numbers of blank rows below the header.
fn blank_rows(rows: &SheetRows) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .filter(|(_, cells)| is_blank(cells))
        .map(|(index, _)| index + 1)
        .collect()
}

fn log_stats(kind: &str, stats: &OperationStats) {
    info!(
        "Imported {}: {} created, {} updated, {} failed",
        kind, stats.created_count, stats.updated_count, stats.failed_count
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::KnowledgeProgram;
    use crate::testing::TestContext;

    fn sheet(rows: &[&[(usize, &str)]]) -> SheetRows {
        let mut out = vec![vec!["header".to_string()]];
        for values in rows {
            let mut cells = vec![String::new(); 30];
            for (i, v) in values.iter() {
                cells[*i] = v.to_string();
            }
            out.push(cells);
        }
        out
    }

    fn program_sheet() -> SheetRows {
        sheet(&[
            &[(2, "ITB"), (13, "Informatika"), (14, "S1")],
            &[(2, ""), (13, "Orphan"), (14, "S1")],
            &[(2, "itb"), (13, "Kimia"), (14, "S1")],
        ])
    }

    async fn with_catalog() -> TestContext {
        let ctx = TestContext::new();
        ctx.state
            .knowledge
            .create("2024", vec![KnowledgeProgram { name: "saintek".into(), ..Default::default() }])
            .await
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn program_import_counts_and_links() {
        let ctx = with_catalog().await;
        let imports = &ctx.state.imports;

        let first = imports.import_program_rows("2024", "saintek", &program_sheet()).await.unwrap();
        assert_eq!(first.university_stats.created_count, 1);
        assert_eq!(first.university_stats.updated_count, 1);
        assert_eq!(first.university_stats.failed_rows, vec![3]);
        assert_eq!(first.university_stats.total(), 3);
        assert_eq!(first.program_stats.created_count, 2);

        let second = imports.import_program_rows("2024", "saintek", &program_sheet()).await.unwrap();
        assert_eq!(second.program_stats.created_count, 0);
        assert_eq!(second.program_stats.updated_count, 2);

        let catalog = ctx.state.study_programs.catalog_program("2024", "saintek").await.unwrap();
        assert_eq!(catalog.study_programs.len(), 2);
    }

    #[tokio::test]
    async fn program_import_needs_catalog() {
        let ctx = TestContext::new();
        let result = ctx
            .state
            .imports
            .import_programs_upload("2030", "saintek", "programs.xlsx", Vec::new())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn student_import_is_idempotent_on_natural_key() {
        let ctx = TestContext::new();
        let imports = &ctx.state.imports;
        let rows = sheet(&[
            &[(1, "Ayu"), (3, "SMA 1"), (12, "0812")],
            &[(1, "Budi"), (3, "sma 1"), (12, "0813")],
            &[(1, ""), (3, "SMA 2"), (12, "0814")],
        ]);

        let first = imports.import_student_rows(&rows).await.unwrap();
        assert_eq!(first.school_stats.created_count, 2);
        assert_eq!(first.school_stats.updated_count, 1);
        assert_eq!(first.student_stats.created_count, 2);
        assert_eq!(first.student_stats.failed_rows, vec![4]);
        assert!(first.skipped_rows.is_empty());

        let second = imports.import_student_rows(&rows).await.unwrap();
        assert_eq!(second.student_stats.created_count, 0);
        assert_eq!(second.student_stats.updated_count, 2);
    }

    #[tokio::test]
    async fn blank_rows_are_reported_as_skipped() {
        let ctx = TestContext::new();
        let rows = sheet(&[
            &[(1, "Ayu"), (3, "SMA 1")],
            &[],
            &[(1, "Budi"), (3, "SMA 1")],
            &[],
        ]);

        let result = ctx.state.imports.import_student_rows(&rows).await.unwrap();
        assert_eq!(result.skipped_rows, vec![3, 5]);
        assert_eq!(result.student_stats.total(), 2);
        assert_eq!(result.school_stats.total(), 2);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["skipped_rows"], serde_json::json!([3, 5]));
    }
}
