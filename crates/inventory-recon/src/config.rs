//! Run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::input::LoaderConfig;

/// Header row of the reference export (two preamble rows precede it).
pub const REFERENCE_HEADER_ROW: usize = 2;
/// Header row of the target export.
pub const TARGET_HEADER_ROW: usize = 0;

/// Per-input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Name of the system of record, used in messages and issue notes.
    pub label: String,
    /// Zero-based row holding the column names.
    pub header_row: usize,
    /// Worksheet to read (None = first sheet).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
}

impl SourceConfig {
    /// Defaults for the reference (Modon) export.
    pub fn reference() -> Self {
        Self {
            label: "Modon".to_string(),
            header_row: REFERENCE_HEADER_ROW,
            sheet: None,
        }
    }

    /// Defaults for the target (Sakneen) export.
    pub fn target() -> Self {
        Self {
            label: "Sakneen".to_string(),
            header_row: TARGET_HEADER_ROW,
            sheet: None,
        }
    }

    /// Loader settings for this source.
    pub fn loader(&self, keep_default_na: bool) -> LoaderConfig {
        LoaderConfig {
            header_row: self.header_row,
            sheet: self.sheet.clone(),
            keep_default_na,
        }
    }
}

/// Where and how output artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving every artifact.
    pub dir: PathBuf,
    /// Fixed name of the annotated target workbook (overwritten each run).
    pub annotated_file_name: String,
    /// Worksheet name inside the annotated workbook.
    pub annotated_sheet_name: String,
    /// Worksheet name inside the discrepancy workbook.
    pub discrepancy_sheet_name: String,
    /// RGB fill for flagged rows.
    pub highlight_color: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            annotated_file_name: "sakneen_highlighted.xlsx".to_string(),
            annotated_sheet_name: "Sakneen_With_Highlights".to_string(),
            discrepancy_sheet_name: "Discrepancies".to_string(),
            highlight_color: 0xFFFF00,
        }
    }
}

/// Configuration for a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Source-of-truth export.
    pub reference: SourceConfig,
    /// Audited export.
    pub target: SourceConfig,
    /// Output artifacts.
    pub output: OutputConfig,
    /// Read common NA markers (`N/A`, `NULL`, ...) as empty cells.
    pub keep_default_na: bool,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            reference: SourceConfig::reference(),
            target: SourceConfig::target(),
            output: OutputConfig::default(),
            keep_default_na: true,
        }
    }
}

impl ReconConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.dir = dir.into();
        self
    }

    /// Override both header rows.
    pub fn with_header_rows(mut self, reference: usize, target: usize) -> Self {
        self.reference.header_row = reference;
        self.target.header_row = target;
        self
    }

    /// Rename the two systems of record.
    pub fn with_labels(mut self, reference: impl Into<String>, target: impl Into<String>) -> Self {
        self.reference.label = reference.into();
        self.target.label = target.into();
        self
    }

    /// Check settings that would otherwise fail halfway through a run.
    pub fn validate(&self) -> Result<()> {
        if self.reference.label.trim().is_empty() || self.target.label.trim().is_empty() {
            return Err(ReconError::Config("system labels must not be blank".to_string()));
        }

        let name = &self.output.annotated_file_name;
        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name.as_str()) {
            return Err(ReconError::Config(format!(
                "annotated file name '{}' must be a bare file name",
                name
            )));
        }
        if name.starts_with("discrepancies_") {
            return Err(ReconError::Config(format!(
                "annotated file name '{}' collides with the export names",
                name
            )));
        }

        Ok(())
    }
}
