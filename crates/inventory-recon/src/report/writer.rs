//! Writes the annotated target workbook and the discrepancy exports.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};

use super::artifacts::{ArtifactGuard, ExportFiles, ReportArtifacts, RunStamp};
use crate::config::OutputConfig;
use crate::error::{ReconError, Result};
use crate::input::CellValue;
use crate::reconcile::{AnnotatedRow, AnnotatedTable, Discrepancy, Fill};

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// The structured discrepancy export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscrepancyDocument {
    pub timestamp: String,
    pub total_discrepancies: usize,
    pub discrepancies: Vec<Discrepancy>,
}

/// Renders reconciliation results into files under the configured directory.
pub struct ReportWriter {
    config: OutputConfig,
}

impl ReportWriter {
    /// Create a writer for the given output settings.
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Write every artifact for one run.
    ///
    /// Either all four files exist afterwards or none of this run's files do.
    pub fn write(
        &self,
        table: &AnnotatedTable,
        discrepancies: &[Discrepancy],
        stamp: &RunStamp,
    ) -> Result<ReportArtifacts> {
        let dir = &self.config.dir;
        fs::create_dir_all(dir).map_err(|e| ReconError::io(dir, e))?;

        let annotated = dir.join(&self.config.annotated_file_name);
        let exports = ExportFiles::allocate(dir, stamp);
        let mut guard = ArtifactGuard::new();

        guard.track(&annotated);
        self.write_annotated(table, &annotated)?;

        guard.track(&exports.csv);
        write_csv(discrepancies, &exports.csv)?;

        guard.track(&exports.excel);
        self.write_discrepancy_workbook(discrepancies, &exports.excel)?;

        guard.track(&exports.json);
        write_json(discrepancies, stamp, &exports.json)?;

        guard.commit();

        tracing::debug!(
            annotated = %annotated.display(),
            csv = %exports.csv.display(),
            "wrote report artifacts"
        );

        Ok(ReportArtifacts {
            annotated,
            exports,
            timestamp: stamp.clone(),
        })
    }

    /// Write the target table with `Highlight`/`Issue` columns and filled flagged rows.
    pub fn write_annotated(&self, table: &AnnotatedTable, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.annotated_sheet_name)?;

        write_header(worksheet, &table.output_columns())?;

        let plain = Format::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            let format = match row.fill {
                Some(fill) => fill_format(fill),
                None => plain.clone(),
            };
            write_annotated_row(worksheet, row_idx as u32 + 1, row, &format)?;
        }

        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofit();
        workbook.save(path)?;
        Ok(())
    }

    /// Write the discrepancy list as a single-sheet workbook.
    pub fn write_discrepancy_workbook(&self, discrepancies: &[Discrepancy], path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.config.discrepancy_sheet_name)?;

        write_header(worksheet, &Discrepancy::HEADERS)?;
        for (row_idx, discrepancy) in discrepancies.iter().enumerate() {
            for (col, value) in discrepancy.to_record().iter().enumerate() {
                worksheet.write_string(row_idx as u32 + 1, col as u16, *value)?;
            }
        }

        worksheet.autofit();
        workbook.save(path)?;
        Ok(())
    }
}

/// Write the discrepancy list as CSV with a header row (even when empty).
pub fn write_csv(discrepancies: &[Discrepancy], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(Discrepancy::HEADERS)?;
    for discrepancy in discrepancies {
        writer.write_record(discrepancy.to_record())?;
    }
    writer.flush().map_err(|e| ReconError::io(path, e))?;
    Ok(())
}

/// Write `{ timestamp, total_discrepancies, discrepancies }` as pretty JSON.
pub fn write_json(discrepancies: &[Discrepancy], stamp: &RunStamp, path: &Path) -> Result<()> {
    let document = DiscrepancyDocument {
        timestamp: stamp.as_str().to_string(),
        total_discrepancies: discrepancies.len(),
        discrepancies: discrepancies.to_vec(),
    };
    let file = File::create(path).map_err(|e| ReconError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document)?;
    Ok(())
}

fn fill_format(fill: Fill) -> Format {
    Format::new().set_background_color(Color::RGB(fill.rgb))
}

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }
    Ok(())
}

fn write_annotated_row(
    worksheet: &mut Worksheet,
    row: u32,
    annotated: &AnnotatedRow,
    format: &Format,
) -> Result<()> {
    let filled = annotated.fill.is_some();

    for (col, cell) in annotated.cells.iter().enumerate() {
        write_cell(worksheet, row, col as u16, cell, format, filled)?;
    }

    let highlight_col = annotated.cells.len() as u16;
    worksheet.write_boolean_with_format(row, highlight_col, annotated.flagged, format)?;

    let issue = if annotated.issue.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(annotated.issue.clone())
    };
    write_cell(worksheet, row, highlight_col + 1, &issue, format, filled)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
    filled: bool,
) -> Result<()> {
    match cell {
        // Blank cells only need writing when they carry a fill.
        CellValue::Empty if filled => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Empty => {}
        CellValue::Text(s) | CellValue::Error(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::DateTime(serial) => {
            let date_format = format.clone().set_num_format(DATE_FORMAT);
            worksheet.write_number_with_format(row, col, *serial, &date_format)?;
        }
    }
    Ok(())
}
