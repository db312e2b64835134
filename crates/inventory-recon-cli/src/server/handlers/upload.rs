//! Upload handler: stage both workbooks and run a reconciliation.

use std::io::Write;
use std::path::Path;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use inventory_recon::{InventoryRecon, ReconError, ReconReport, ReconResponse};
use tempfile::NamedTempFile;

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Multipart field carrying the reference workbook.
pub const REFERENCE_FIELD: &str = "modon_file";
/// Multipart field carrying the target workbook.
pub const TARGET_FIELD: &str = "sakneen_file";

/// One uploaded file held in memory until staged.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Accept both exports and return the reconciliation result record.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReconResponse>, ApiError> {
    let mut reference = None;
    let mut target = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let slot = match field.name() {
            Some(REFERENCE_FIELD) => &mut reference,
            Some(TARGET_FIELD) => &mut target,
            _ => continue,
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        *slot = Some(Upload { file_name, bytes });
    }

    let (Some(reference), Some(target)) = (reference, target) else {
        return Err(ApiError::BadRequest(
            "Both Modon and Sakneen files are required".to_string(),
        ));
    };
    validate(&reference, &target)?;

    let _run = state.run_lock.lock().await;
    let recon = state.recon.clone();
    let dir = state.upload_dir.clone();

    let response = tokio::task::spawn_blocking(move || {
        ReconResponse::from(run_staged(&recon, &dir, &reference, &target))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    match &response {
        ReconResponse::Success(success) => {
            tracing::info!(discrepancies = success.total_discrepancies, "upload reconciled")
        }
        ReconResponse::Failure(failure) => tracing::warn!(error = %failure.error, "upload failed"),
    }

    Ok(Json(response))
}

fn validate(reference: &Upload, target: &Upload) -> Result<(), ApiError> {
    if reference.file_name.is_empty() || target.file_name.is_empty() {
        return Err(ApiError::BadRequest("Both files must be selected".to_string()));
    }
    if !is_excel(&reference.file_name) {
        return Err(ApiError::BadRequest(
            "Modon file must be an Excel file (.xlsx or .xls)".to_string(),
        ));
    }
    if !is_excel(&target.file_name) {
        return Err(ApiError::BadRequest(
            "Sakneen file must be an Excel file (.xlsx or .xls)".to_string(),
        ));
    }
    Ok(())
}

fn is_excel(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Stage both uploads next to the outputs; the staged copies are removed on return.
///
/// Errors and metadata name the files as uploaded, not their staged copies.
fn run_staged(
    recon: &InventoryRecon,
    dir: &Path,
    reference: &Upload,
    target: &Upload,
) -> inventory_recon::Result<ReconReport> {
    let reference_file = stage(dir, reference)?;
    let target_file = stage(dir, target)?;
    let staged = [
        (staged_name(&reference_file), reference),
        (staged_name(&target_file), target),
    ];

    let mut report = recon
        .try_run_files(reference_file.path(), target_file.path())
        .map_err(|e| match e {
            ReconError::Load {
                source_name,
                message,
            } => {
                let source_name = staged
                    .iter()
                    .find(|(name, _)| *name == source_name)
                    .map_or(source_name, |(_, upload)| upload.file_name.clone());
                ReconError::Load {
                    source_name,
                    message,
                }
            }
            other => other,
        })?;

    report.reference.file = reference.file_name.clone();
    report.target.file = target.file_name.clone();
    Ok(report)
}

fn staged_name(file: &NamedTempFile) -> String {
    file.path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn stage(dir: &Path, upload: &Upload) -> inventory_recon::Result<NamedTempFile> {
    let extension = Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx")
        .to_lowercase();

    let io_error = |source: std::io::Error| ReconError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix("upload_")
        .suffix(&format!(".{}", extension))
        .tempfile_in(dir)
        .map_err(io_error)?;
    file.write_all(&upload.bytes).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_recon::ReconConfig;

    #[test]
    fn test_is_excel() {
        assert!(is_excel("modon.xlsx"));
        assert!(is_excel("MODON.XLS"));
        assert!(!is_excel("modon.csv"));
        assert!(!is_excel("xlsx"));
    }

    #[test]
    fn test_staged_copy_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let upload = Upload {
            file_name: "Modon Report.XLSX".to_string(),
            bytes: Bytes::from_static(b"data"),
        };

        let staged = stage(dir.path(), &upload).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.extension().is_some_and(|e| e == "xlsx"));
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_load_error_names_uploaded_file() {
        let dir = tempfile::tempdir().unwrap();
        let recon = InventoryRecon::with_config(ReconConfig::new().with_output_dir(dir.path()));
        let reference = Upload {
            file_name: "Modon Report.xlsx".to_string(),
            bytes: Bytes::from_static(b"not a workbook"),
        };
        let target = Upload {
            file_name: "sakneen.xlsx".to_string(),
            bytes: Bytes::from_static(b"not a workbook"),
        };

        let err = run_staged(&recon, dir.path(), &reference, &target).unwrap_err();
        assert!(!err.to_string().contains("upload_"));
        match err {
            ReconError::Load { source_name, .. } => assert_eq!(source_name, "Modon Report.xlsx"),
            other => panic!("expected load error, got {other:?}"),
        }
    }
}
