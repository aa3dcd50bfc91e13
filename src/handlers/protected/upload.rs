// handlers/protected/upload.rs - multipart uploads: student images and spreadsheet imports

use std::collections::HashMap;

use axum::extract::{Multipart, State};

use crate::error::ApiError;
use crate::import::{ImportResult, StudentImportResult};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// One file part plus every plain text field of a multipart body.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                form.file = Some((filename, bytes.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn take_file(&mut self) -> Result<(String, Vec<u8>), ApiError> {
        self.file
            .take()
            .ok_or_else(|| ApiError::bad_request("File is not present in the form data"))
    }

    fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// POST /student/upload - Store an image and return its public URL
pub async fn image(State(state): State<AppState>, multipart: Multipart) -> ApiResult<String> {
    let mut form = UploadForm::read(multipart, "image").await?;
    let (filename, bytes) = form.take_file()?;

    let url = state.images.save(&filename, &bytes).await?;
    Ok(ApiResponse::created("Upload Image Success", url))
}

/// POST /student/upload-excel - Bulk import schools and students
pub async fn import_students(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<StudentImportResult> {
    let mut form = UploadForm::read(multipart, "file").await?;
    let (filename, bytes) = form.take_file()?;

    let result = state.imports.import_students_upload(&filename, bytes).await?;
    Ok(ApiResponse::success("Data imported successfully", result))
}

/// POST /study-program/upload - Bulk import universities and study programs
/// into the catalog named by `knowledgeBaseYear` and `knowledgeProgramName`
pub async fn import_programs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<ImportResult> {
    let mut form = UploadForm::read(multipart, "file").await?;
    let (filename, bytes) = form.take_file()?;

    let result = state
        .imports
        .import_programs_upload(
            form.field("knowledgeBaseYear"),
            form.field("knowledgeProgramName"),
            &filename,
            bytes,
        )
        .await?;
    Ok(ApiResponse::success("Data imported successfully", result))
}
