//! Download handlers for the annotated workbook and discrepancy exports.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Export kinds and the extension each one carries.
const EXPORT_TYPES: [(&str, &str); 3] = [("csv", "csv"), ("excel", "xlsx"), ("json", "json")];

/// Download a generated file by name.
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound("File not found".to_string());
    let path = state.artifact_path(&filename).ok_or_else(not_found)?;
    attachment(&path, &filename).await.ok_or_else(not_found)
}

/// Download one of the discrepancy exports.
pub async fn export(
    State(state): State<AppState>,
    Path((export_type, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound("Export file not found".to_string());

    let extension = EXPORT_TYPES
        .iter()
        .find(|(kind, _)| *kind == export_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(not_found)?;
    if !filename.ends_with(&format!(".{}", extension)) {
        return Err(not_found());
    }

    let path = state.artifact_path(&filename).ok_or_else(not_found)?;
    attachment(&path, &filename).await.ok_or_else(not_found)
}

async fn attachment(path: &std::path::Path, filename: &str) -> Option<Response> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read artifact");
            return None;
        }
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Some(
        (
            [
                (header::CONTENT_TYPE, mime.as_ref().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            bytes,
        )
            .into_response(),
    )
}
