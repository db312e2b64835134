//! Output artifacts: annotated workbook and discrepancy exports.

mod artifacts;
mod writer;

pub use artifacts::{ExportFiles, ReportArtifacts, RunStamp};
pub use writer::{DiscrepancyDocument, ReportWriter, write_csv, write_json};
