//! Records produced by the reconciler.

use serde::{Deserialize, Serialize};

use crate::input::CellValue;

/// Status reported for the reference side of every discrepancy.
pub const REFERENCE_STATUS: &str = "Not Available (has EOI)";

/// A target row that shows a unit as available while the reference holds an EOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub unit_id: String,
    pub reference_status: String,
    /// Status cell exactly as it appears in the target table.
    pub target_status: String,
    pub issue: String,
}

impl Discrepancy {
    /// Column headers for tabular exports, in field order.
    pub const HEADERS: [&'static str; 4] = ["unit_id", "reference_status", "target_status", "issue"];

    /// Field values in `HEADERS` order.
    pub fn to_record(&self) -> [&str; 4] {
        [
            self.unit_id.as_str(),
            self.reference_status.as_str(),
            self.target_status.as_str(),
            self.issue.as_str(),
        ]
    }
}

/// Background fill applied to a row when it is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// RGB color, e.g. `0xFFFF00`.
    pub rgb: u32,
}

/// One target row with the reconciler's verdict attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRow {
    /// Original cells, in target column order.
    pub cells: Vec<CellValue>,
    pub flagged: bool,
    /// Empty unless flagged.
    pub issue: String,
    /// Presentation hint; set together with `flagged`.
    pub fill: Option<Fill>,
}

impl AnnotatedRow {
    /// An unflagged copy of a target row.
    pub fn plain(cells: Vec<CellValue>) -> Self {
        Self {
            cells,
            flagged: false,
            issue: String::new(),
            fill: None,
        }
    }

    pub(crate) fn flag(&mut self, issue: String, fill: Fill) {
        self.flagged = true;
        self.issue = issue;
        self.fill = Some(fill);
    }
}

/// The target table plus per-row annotations, in target row order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotatedTable {
    pub columns: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
}

impl AnnotatedTable {
    /// Name of the synthetic flag column.
    pub const HIGHLIGHT_COLUMN: &'static str = "Highlight";
    /// Name of the synthetic issue column.
    pub const ISSUE_COLUMN: &'static str = "Issue";

    /// Rows that were flagged.
    pub fn flagged_rows(&self) -> impl Iterator<Item = &AnnotatedRow> {
        self.rows.iter().filter(|r| r.flagged)
    }

    /// Original columns followed by the two synthetic ones.
    pub fn output_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(String::as_str)
            .chain([Self::HIGHLIGHT_COLUMN, Self::ISSUE_COLUMN])
            .collect()
    }
}
