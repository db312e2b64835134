//! Table model and source metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a loaded input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name as supplied by the caller.
    pub file: String,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Size of the raw bytes.
    pub size_bytes: u64,
    /// Detected format (xlsx, csv, ...).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the input was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a loaded input.
    pub fn new(
        file: impl Into<String>,
        hash: String,
        size_bytes: u64,
        format: impl Into<String>,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            file: file.into(),
            hash,
            size_bytes,
            format: format.into(),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// A single cell as read from a spreadsheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank or NA cell.
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date.
    DateTime(f64),
    /// Spreadsheet error literal such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// True for blank/absent cells.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True when the cell is non-null and its trimmed text is non-empty.
    pub fn has_content(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) | CellValue::DateTime(n) => write!(f, "{}", format_number(*n)),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

/// Format numbers the way they read in a sheet: integers without decimals.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A parsed table: ordered, trimmed column names plus row-major cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in sheet order.
    pub columns: Vec<String>,
    /// Rows, each exactly `columns.len()` cells wide.
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create a table, padding short rows with empty cells.
    ///
    /// Rows wider than the header add `Unnamed: {i}` columns; no cell is dropped.
    pub fn new(mut columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(columns.len());
        for i in columns.len()..width {
            columns.push(format!("Unnamed: {}", i));
        }
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get a specific cell.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell by column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.get(row, self.column_index(column)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_numbers() {
        assert_eq!(CellValue::Number(101.0).to_string(), "101");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_has_content() {
        assert!(!CellValue::Empty.has_content());
        assert!(!CellValue::Text("   ".into()).has_content());
        assert!(CellValue::Text("John Doe".into()).has_content());
        assert!(CellValue::Number(0.0).has_content());
        assert!(CellValue::Bool(false).has_content());
    }

    #[test]
    fn test_table_pads_rows() {
        let table = Table::new(
            vec!["UnitID".into(), "Status".into()],
            vec![vec![CellValue::Text("A1".into())]],
        );
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.cell(0, "Status"), Some(&CellValue::Empty));
        assert_eq!(table.cell(0, "UnitID"), Some(&CellValue::Text("A1".into())));
        assert_eq!(table.cell(0, "Missing"), None);
    }

    #[test]
    fn test_table_keeps_cells_past_header() {
        let table = Table::new(
            vec!["UnitID".into()],
            vec![
                vec![CellValue::Text("A1".into()), CellValue::Text("Available".into())],
                vec![CellValue::Text("A2".into())],
            ],
        );
        assert_eq!(table.columns, vec!["UnitID", "Unnamed: 1"]);
        assert_eq!(table.get(0, 1), Some(&CellValue::Text("Available".into())));
        assert_eq!(table.get(1, 1), Some(&CellValue::Empty));
    }
}
