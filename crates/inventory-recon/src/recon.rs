//! Main engine and the result record returned to hosting layers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ReconConfig;
use crate::error::{ErrorKind, ReconError, Result};
use crate::input::{SourceMetadata, Table, TableLoader};
use crate::reconcile::{Discrepancy, ReconcileStats, Reconciler};
use crate::report::{ExportFiles, ReportArtifacts, ReportWriter, RunStamp};
use crate::schema::ColumnResolver;

/// A named in-memory input, e.g. an uploaded file.
#[derive(Debug, Clone, Copy)]
pub struct InputFile<'a> {
    /// Original file name; its extension selects the parser.
    pub name: &'a str,
    pub bytes: &'a [u8],
}

impl<'a> InputFile<'a> {
    pub fn new(name: &'a str, bytes: &'a [u8]) -> Self {
        Self { name, bytes }
    }
}

/// Typed outcome of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconReport {
    pub reference: SourceMetadata,
    pub target: SourceMetadata,
    pub reference_columns: Vec<String>,
    pub target_columns: Vec<String>,
    pub discrepancies: Vec<Discrepancy>,
    pub stats: ReconcileStats,
    pub artifacts: ReportArtifacts,
}

/// Wire form of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconSuccess {
    pub success: bool,
    pub discrepancies: Vec<Discrepancy>,
    pub total_discrepancies: usize,
    pub output_file: PathBuf,
    pub export_files: ExportFiles,
    #[serde(rename = "modon_columns")]
    pub reference_columns: Vec<String>,
    #[serde(rename = "sakneen_columns")]
    pub target_columns: Vec<String>,
    pub summary: ReconcileStats,
}

/// Wire form of a failed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconFailure {
    pub error: String,
    #[serde(
        rename = "modon_columns",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_columns: Option<Vec<String>>,
    #[serde(
        rename = "sakneen_columns",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_columns: Option<Vec<String>>,
}

/// Result record handed back across the engine boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReconResponse {
    Success(ReconSuccess),
    Failure(ReconFailure),
}

impl ReconResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ReconResponse::Success(_))
    }

    /// Turn an error into the failure record.
    pub fn from_error(err: ReconError) -> Self {
        let (reference_columns, target_columns) = match &err {
            ReconError::MissingColumns {
                reference_columns,
                target_columns,
                ..
            } => (Some(reference_columns.clone()), Some(target_columns.clone())),
            _ => (None, None),
        };

        let error = match err.kind() {
            ErrorKind::MissingColumns => err.to_string(),
            ErrorKind::Load | ErrorKind::Processing => {
                format!("Error processing files: {}", err)
            }
        };

        ReconResponse::Failure(ReconFailure {
            error,
            reference_columns,
            target_columns,
        })
    }
}

impl From<ReconReport> for ReconResponse {
    fn from(report: ReconReport) -> Self {
        ReconResponse::Success(ReconSuccess {
            success: true,
            total_discrepancies: report.discrepancies.len(),
            discrepancies: report.discrepancies,
            output_file: report.artifacts.annotated,
            export_files: report.artifacts.exports,
            reference_columns: report.reference_columns,
            target_columns: report.target_columns,
            summary: report.stats,
        })
    }
}

impl From<Result<ReconReport>> for ReconResponse {
    fn from(result: Result<ReconReport>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(err) => ReconResponse::from_error(err),
        }
    }
}

/// Reconciles a reference export against a target export.
///
/// Every call is independent: tables, indexes and records live only for
/// the duration of the call.
pub struct InventoryRecon {
    config: ReconConfig,
}

impl InventoryRecon {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(ReconConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: ReconConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Run on two in-memory inputs; never fails, errors become a failure record.
    pub fn run(&self, reference: InputFile<'_>, target: InputFile<'_>) -> ReconResponse {
        self.try_run(reference, target).into()
    }

    /// Run on two files; never fails, errors become a failure record.
    pub fn run_files(&self, reference: &Path, target: &Path) -> ReconResponse {
        self.try_run_files(reference, target).into()
    }

    /// Run on two files, returning typed errors.
    pub fn try_run_files(&self, reference: &Path, target: &Path) -> Result<ReconReport> {
        self.config.validate()?;
        let (reference_table, reference_meta) = self.reference_loader().load_file(reference)?;
        let (target_table, target_meta) = self.target_loader().load_file(target)?;
        self.process(reference_table, reference_meta, target_table, target_meta)
    }

    /// Run on two in-memory inputs, returning typed errors.
    pub fn try_run(&self, reference: InputFile<'_>, target: InputFile<'_>) -> Result<ReconReport> {
        self.config.validate()?;
        let (reference_table, reference_meta) = self
            .reference_loader()
            .load_bytes(reference.name, reference.bytes)?;
        let (target_table, target_meta) = self
            .target_loader()
            .load_bytes(target.name, target.bytes)?;
        self.process(reference_table, reference_meta, target_table, target_meta)
    }

    fn reference_loader(&self) -> TableLoader {
        TableLoader::with_config(self.config.reference.loader(self.config.keep_default_na))
    }

    fn target_loader(&self) -> TableLoader {
        TableLoader::with_config(self.config.target.loader(self.config.keep_default_na))
    }

    fn process(
        &self,
        reference: Table,
        reference_meta: SourceMetadata,
        target: Table,
        target_meta: SourceMetadata,
    ) -> Result<ReconReport> {
        let reference_label = &self.config.reference.label;
        let target_label = &self.config.target.label;

        tracing::debug!(label = %reference_label, columns = ?reference.columns, "reference columns");
        tracing::debug!(label = %target_label, columns = ?target.columns, "target columns");

        let (reference_columns, target_columns) =
            ColumnResolver::new(reference_label, target_label).resolve(&reference, &target)?;

        let outcome = Reconciler::new(reference_label.as_str(), target_label.as_str())
            .with_fill(self.config.output.highlight_color)
            .reconcile(&reference, &reference_columns, &target, &target_columns)?;

        let artifacts = ReportWriter::new(self.config.output.clone()).write(
            &outcome.table,
            &outcome.discrepancies,
            &RunStamp::now(),
        )?;

        Ok(ReconReport {
            reference: reference_meta,
            target: target_meta,
            reference_columns: reference.columns,
            target_columns: target.columns,
            discrepancies: outcome.discrepancies,
            stats: outcome.stats,
            artifacts,
        })
    }
}

impl Default for InventoryRecon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(dir: &Path) -> InventoryRecon {
        InventoryRecon::with_config(ReconConfig::new().with_output_dir(dir))
    }

    const REFERENCE: &[u8] = b"Modon Inventory\nExported 2024-01-01\nUnit Number,EOI\nA1,John Doe\nA2,\n";

    #[test]
    fn test_success_record_shape() {
        let dir = tempfile::tempdir().unwrap();
        let response = engine(dir.path()).run(
            InputFile::new("modon.csv", REFERENCE),
            InputFile::new("sakneen.csv", b"UnitID,Status\nA1,Available\nA2,Available\n"),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["total_discrepancies"], 1);
        assert_eq!(json["discrepancies"][0]["unit_id"], "A1");
        assert_eq!(json["modon_columns"], serde_json::json!(["Unit Number", "EOI"]));
        assert_eq!(json["sakneen_columns"], serde_json::json!(["UnitID", "Status"]));
        assert!(json["export_files"]["csv"].as_str().unwrap().ends_with(".csv"));
        assert!(json["output_file"]
            .as_str()
            .unwrap()
            .ends_with("sakneen_highlighted.xlsx"));
    }

    #[test]
    fn test_missing_columns_record() {
        let dir = tempfile::tempdir().unwrap();
        let response = engine(dir.path()).run(
            InputFile::new("modon.csv", REFERENCE),
            InputFile::new("sakneen.csv", b"UnitID,State\nA1,Available\n"),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert!(!response.is_success());
        assert_eq!(json["error"], "Missing required columns: Status in Sakneen");
        assert_eq!(json["sakneen_columns"], serde_json::json!(["UnitID", "State"]));
        assert!(json.get("success").is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_load_error_record() {
        let dir = tempfile::tempdir().unwrap();
        let response = engine(dir.path()).run(
            InputFile::new("modon.xlsx", b"not a workbook"),
            InputFile::new("sakneen.csv", b"UnitID,Status\n"),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Error processing files: Failed to load 'modon.xlsx'"));
        assert!(json.get("modon_columns").is_none());
    }
}
