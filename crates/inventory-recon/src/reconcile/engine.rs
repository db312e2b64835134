//! Key-based join between the reference and target tables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::record::{AnnotatedRow, AnnotatedTable, Discrepancy, Fill, REFERENCE_STATUS};
use crate::error::Result;
use crate::input::{CellValue, Table};
use crate::schema::{ReferenceColumns, TargetColumns};

/// Unit key -> "has an active expression of interest".
///
/// Duplicate keys keep their first position but take the last row's flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceIndex {
    units: IndexMap<String, bool>,
}

impl ReferenceIndex {
    /// Number of distinct unit keys.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// EOI flag for a normalized key, if the unit is known.
    pub fn has_interest(&self, key: &str) -> Option<bool> {
        self.units.get(key).copied()
    }

    fn insert(&mut self, key: String, has_interest: bool) {
        self.units.insert(key, has_interest);
    }
}

/// Counters describing one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub reference_rows: usize,
    pub indexed_units: usize,
    pub target_rows: usize,
    /// Target rows whose key was found in the reference index.
    pub matched_rows: usize,
    pub flagged_rows: usize,
}

/// Annotated target rows plus the discrepancies found in them.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub table: AnnotatedTable,
    pub discrepancies: Vec<Discrepancy>,
    pub stats: ReconcileStats,
}

/// Normalized unit key for a cell: `None` for blank cells.
///
/// Error values key by their literal (`#REF!`), like any other text.
pub fn unit_key(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        other => Some(other.to_string().trim().to_string()),
    }
}

static EMPTY: CellValue = CellValue::Empty;

fn cell(row: &[CellValue], index: usize) -> &CellValue {
    row.get(index).unwrap_or(&EMPTY)
}

/// True when a status cell reads "available", ignoring case and padding.
pub fn is_available(status: &CellValue) -> bool {
    status.to_string().trim().to_lowercase() == "available"
}

/// Flags target rows that are marketed as available despite a reference EOI.
#[derive(Debug, Clone)]
pub struct Reconciler {
    reference_label: String,
    target_label: String,
    fill: Fill,
}

impl Reconciler {
    /// Create a reconciler for the two named systems.
    pub fn new(reference_label: impl Into<String>, target_label: impl Into<String>) -> Self {
        Self {
            reference_label: reference_label.into(),
            target_label: target_label.into(),
            fill: Fill { rgb: 0xFFFF00 },
        }
    }

    /// Set the fill attached to flagged rows.
    pub fn with_fill(mut self, rgb: u32) -> Self {
        self.fill = Fill { rgb };
        self
    }

    /// Build the unit -> EOI index from the reference table.
    pub fn build_index(&self, reference: &Table, columns: &ReferenceColumns) -> ReferenceIndex {
        let mut index = ReferenceIndex::default();

        for row in &reference.rows {
            if let Some(key) = unit_key(cell(row, columns.key.index)) {
                index.insert(key, cell(row, columns.interest.index).has_content());
            }
        }

        index
    }

    /// Scan the target table against the reference and annotate every row.
    pub fn reconcile(
        &self,
        reference: &Table,
        reference_columns: &ReferenceColumns,
        target: &Table,
        target_columns: &TargetColumns,
    ) -> Result<ReconcileOutcome> {
        let index = self.build_index(reference, reference_columns);

        let mut rows = Vec::with_capacity(target.row_count());
        let mut discrepancies = Vec::new();
        let mut matched_rows = 0;

        for cells in &target.rows {
            let mut row = AnnotatedRow::plain(cells.clone());
            let raw_key = cell(cells, target_columns.key.index);

            let Some(key) = unit_key(raw_key) else {
                rows.push(row);
                continue;
            };

            // Units absent from the reference are not evaluated.
            if let Some(has_interest) = index.has_interest(&key) {
                matched_rows += 1;
                let status = cell(cells, target_columns.status.index);

                if has_interest && is_available(status) {
                    row.flag(self.issue_note(raw_key), self.fill);
                    discrepancies.push(Discrepancy {
                        unit_id: raw_key.to_string(),
                        reference_status: REFERENCE_STATUS.to_string(),
                        target_status: status.to_string(),
                        issue: self.issue_message(),
                    });
                }
            }

            rows.push(row);
        }

        let stats = ReconcileStats {
            reference_rows: reference.row_count(),
            indexed_units: index.len(),
            target_rows: target.row_count(),
            matched_rows,
            flagged_rows: discrepancies.len(),
        };

        tracing::info!(
            reference_units = stats.indexed_units,
            target_rows = stats.target_rows,
            matched = stats.matched_rows,
            discrepancies = stats.flagged_rows,
            "reconciliation complete"
        );

        Ok(ReconcileOutcome {
            table: AnnotatedTable {
                columns: target.columns.clone(),
                rows,
            },
            discrepancies,
            stats,
        })
    }

    fn issue_note(&self, unit: &CellValue) -> String {
        format!(
            "Unit {} has EOI in {} but shows as Available in {}",
            unit, self.reference_label, self.target_label
        )
    }

    fn issue_message(&self) -> String {
        format!(
            "Unit has EOI in {} but shows as Available in {}",
            self.reference_label, self.target_label
        )
    }
}
