//! Error types for the reconciliation library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for reconciliation operations.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input could not be read as a table.
    #[error("Failed to load '{source_name}': {message}")]
    Load {
        source_name: String,
        message: String,
    },

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// One or more semantic columns could not be located.
    #[error("Missing required columns: {}", missing.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        reference_columns: Vec<String>,
        target_columns: Vec<String>,
    },

    /// Any other failure while reconciling rows.
    #[error("{0}")]
    Processing(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing a workbook.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// The three failure classes a reconciliation run can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is not a readable spreadsheet or the header offset is out of range.
    Load,
    /// Required columns could not be resolved.
    MissingColumns,
    /// Everything else.
    Processing,
}

impl ReconError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconError::Load { .. } | ReconError::UnsupportedFormat(_) => ErrorKind::Load,
            ReconError::MissingColumns { .. } => ErrorKind::MissingColumns,
            _ => ErrorKind::Processing,
        }
    }

    pub(crate) fn load(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        ReconError::Load {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReconError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = ReconError::MissingColumns {
            missing: vec!["EOI in Modon".to_string(), "Status in Sakneen".to_string()],
            reference_columns: vec![],
            target_columns: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Missing required columns: EOI in Modon, Status in Sakneen"
        );
        assert_eq!(err.kind(), ErrorKind::MissingColumns);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ReconError::load("a.xlsx", "bad zip").kind(), ErrorKind::Load);
        assert_eq!(
            ReconError::UnsupportedFormat("pdf".into()).kind(),
            ErrorKind::Load
        );
        assert_eq!(
            ReconError::Processing("boom".into()).kind(),
            ErrorKind::Processing
        );
    }
}
