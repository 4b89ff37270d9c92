//! Multipart form reading for the screening endpoints.
//!
//! Parts with a `filename` parameter are files (even when the filename is
//! empty); parts without one are plain form fields. Uploads stay in memory and
//! are dropped with the form.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

pub const JOB_DESCRIPTION_FIELD: &str = "job_description";
pub const STRICTNESS_FIELD: &str = "strictness";

#[derive(Debug, Clone)]
pub struct UploadedResume {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedResume {
    pub fn has_filename(&self) -> bool {
        !self.filename.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ScreeningForm {
    /// Files submitted under the requested field name, in submission order.
    pub files: Vec<UploadedResume>,
    pub job_description: Option<String>,
    pub strictness: Option<String>,
}

/// Reads every part of the body, keeping files named `file_field` and the
/// first value of each known text field.
pub async fn read_screening_form(
    multipart: &mut Multipart,
    file_field: &str,
) -> Result<ScreeningForm, AppError> {
    let mut form = ScreeningForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        match (name.as_str(), filename) {
            (n, Some(filename)) if n == file_field => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read uploaded file '{filename}': {e}"))
                })?;
                form.files.push(UploadedResume { filename, bytes });
            }
            (JOB_DESCRIPTION_FIELD, None) if form.job_description.is_none() => {
                form.job_description = Some(read_text(field, JOB_DESCRIPTION_FIELD).await?);
            }
            (STRICTNESS_FIELD, None) if form.strictness.is_none() => {
                form.strictness = Some(read_text(field, STRICTNESS_FIELD).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))
}
