//! Spreadsheet and delimited-text loader with a fixed header-row offset.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{CellErrorType, Data, Reader, open_workbook_auto_from_rs};
use sha2::{Digest, Sha256};

use super::source::{CellValue, SourceMetadata, Table};
use crate::error::{ReconError, Result};

/// Text values read as missing, matching the usual spreadsheet NA markers.
pub const DEFAULT_NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Input file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Excel or OpenDocument workbook.
    Workbook,
    /// Delimited text with the given delimiter.
    Delimited(u8),
}

impl InputFormat {
    /// Detect the format from a file name's extension.
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(InputFormat::Workbook),
            "csv" => Ok(InputFormat::Delimited(b',')),
            "tsv" | "tab" => Ok(InputFormat::Delimited(b'\t')),
            "" => Err(ReconError::UnsupportedFormat(format!(
                "'{}' has no file extension",
                name
            ))),
            other => Err(ReconError::UnsupportedFormat(format!(
                "'.{}' files are not spreadsheets",
                other
            ))),
        }
    }

    fn label(&self, name: &str) -> String {
        match self {
            InputFormat::Workbook => Path::new(name)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_else(|| "xlsx".to_string()),
            InputFormat::Delimited(b'\t') => "tsv".to_string(),
            InputFormat::Delimited(_) => "csv".to_string(),
        }
    }
}

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Zero-based sheet row holding the column names.
    pub header_row: usize,
    /// Worksheet to read (None = first sheet).
    pub sheet: Option<String>,
    /// Treat `DEFAULT_NA_TOKENS` as empty cells.
    pub keep_default_na: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            header_row: 0,
            sheet: None,
            keep_default_na: true,
        }
    }
}

impl LoaderConfig {
    /// Configuration with the given header row.
    pub fn with_header_row(header_row: usize) -> Self {
        Self {
            header_row,
            ..Self::default()
        }
    }
}

/// Loads a table from a workbook or delimited file.
pub struct TableLoader {
    config: LoaderConfig,
}

impl TableLoader {
    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a table from a file on disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ReconError::io(path, e))?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.load_bytes(&name, &bytes)
    }

    /// Load a table from raw bytes; `name` selects the format by extension.
    pub fn load_bytes(&self, name: &str, bytes: &[u8]) -> Result<(Table, SourceMetadata)> {
        let format = InputFormat::from_name(name)?;

        let table = match format {
            InputFormat::Workbook => self.read_workbook(name, bytes)?,
            InputFormat::Delimited(delimiter) => self.read_delimited(name, bytes, delimiter)?,
        };

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        tracing::debug!(
            source = name,
            header_row = self.config.header_row,
            columns = ?table.columns,
            rows = table.row_count(),
            "loaded table"
        );

        let metadata = SourceMetadata::new(
            name,
            hash,
            bytes.len() as u64,
            format.label(name),
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    fn read_workbook(&self, name: &str, bytes: &[u8]) -> Result<Table> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ReconError::load(name, format!("not a readable spreadsheet: {}", e)))?;

        let sheet_name = match &self.config.sheet {
            Some(sheet) => sheet.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| ReconError::load(name, "workbook contains no sheets"))?,
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ReconError::load(name, format!("failed to read sheet '{}': {}", sheet_name, e)))?;

        let (Some(_), Some((end_row, end_col))) = (range.start(), range.end()) else {
            return Err(self.header_out_of_bounds(name, 0));
        };

        let sheet_rows = end_row as usize + 1;
        if self.config.header_row >= sheet_rows {
            return Err(self.header_out_of_bounds(name, sheet_rows));
        }

        // Positions are absolute so leading blank rows count toward the offset.
        let width = end_col as usize + 1;
        let grid: Vec<Vec<CellValue>> = (self.config.header_row..sheet_rows)
            .map(|row| {
                (0..width)
                    .map(|col| {
                        range
                            .get_value((row as u32, col as u32))
                            .map(|cell| self.convert_cell(cell))
                            .unwrap_or(CellValue::Empty)
                    })
                    .collect()
            })
            .collect();

        Ok(self.build_table(grid))
    }

    fn read_delimited(&self, name: &str, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut grid = Vec::new();
        let mut sheet_rows = 0;
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ReconError::load(name, e.to_string()))?;
            sheet_rows += 1;
            if row_idx < self.config.header_row {
                continue;
            }
            grid.push(
                record
                    .iter()
                    .map(|s| self.convert_text(s.to_string()))
                    .collect::<Vec<_>>(),
            );
        }

        if grid.is_empty() {
            return Err(self.header_out_of_bounds(name, sheet_rows));
        }

        Ok(self.build_table(grid))
    }

    /// Turn a grid whose first row is the header into a table.
    fn build_table(&self, mut grid: Vec<Vec<CellValue>>) -> Table {
        let mut header = grid.remove(0);
        // Delimited rows may run past the header; those positions get blank names.
        let width = grid.iter().map(Vec::len).max().unwrap_or(0);
        if header.len() < width {
            header.resize(width, CellValue::Empty);
        }
        let columns = normalize_headers(header.iter().map(|c| c.to_string()));

        while grid
            .last()
            .is_some_and(|row| row.iter().all(CellValue::is_empty))
        {
            grid.pop();
        }

        Table::new(columns, grid)
    }

    fn convert_cell(&self, cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => self.convert_text(s.clone()),
            Data::Float(n) => CellValue::Number(*n),
            Data::Int(n) => CellValue::Number(*n as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(CellErrorType::NA) if self.config.keep_default_na => CellValue::Empty,
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }

    fn convert_text(&self, s: String) -> CellValue {
        if s.is_empty() || (self.config.keep_default_na && DEFAULT_NA_TOKENS.contains(&s.as_str())) {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }

    fn header_out_of_bounds(&self, name: &str, sheet_rows: usize) -> ReconError {
        ReconError::load(
            name,
            format!(
                "header row {} is outside the sheet ({} rows)",
                self.config.header_row, sheet_rows
            ),
        )
    }
}

impl Default for TableLoader {
    fn default() -> Self {
        Self::with_config(LoaderConfig::default())
    }
}

/// Trim header names, name blanks `Unnamed: {i}` and suffix duplicates.
pub fn normalize_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut columns = Vec::new();

    for (i, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            trimmed.to_string()
        };

        let mut suffix = suffixes.get(&base).copied().unwrap_or(0);
        let mut candidate = base.clone();
        while used.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }
        suffixes.insert(base, suffix);
        used.insert(candidate.clone());
        columns.push(candidate);
    }

    columns
}
