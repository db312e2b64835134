//! Semantic column roles and their header markers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which input a role is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSide {
    /// Source-of-truth table (Modon).
    Reference,
    /// Audited table (Sakneen).
    Target,
}

/// A column the reconciler needs, independent of its exact header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Unit number in the reference table.
    ReferenceKey,
    /// Expression-of-interest column in the reference table.
    ReferenceInterest,
    /// Unit id in the target table.
    TargetKey,
    /// Availability status in the target table.
    TargetStatus,
}

impl ColumnRole {
    /// All roles in declaration order.
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::ReferenceKey,
        ColumnRole::ReferenceInterest,
        ColumnRole::TargetKey,
        ColumnRole::TargetStatus,
    ];

    /// Lowercase substrings that identify this role's header.
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::ReferenceKey => &["unit number"],
            ColumnRole::ReferenceInterest => &["eoi"],
            ColumnRole::TargetKey => &["unitid", "unit id"],
            ColumnRole::TargetStatus => &["status"],
        }
    }

    /// Table the role belongs to.
    pub fn side(&self) -> TableSide {
        match self {
            ColumnRole::ReferenceKey | ColumnRole::ReferenceInterest => TableSide::Reference,
            ColumnRole::TargetKey | ColumnRole::TargetStatus => TableSide::Target,
        }
    }

    /// Roles that belong to one table.
    pub fn for_side(side: TableSide) -> impl Iterator<Item = ColumnRole> {
        Self::ALL.into_iter().filter(move |r| r.side() == side)
    }

    /// True if a header matches any of this role's markers, ignoring case.
    pub fn matches(&self, header: &str) -> bool {
        let folded = header.to_lowercase();
        self.markers().iter().any(|m| folded.contains(m))
    }

    /// Name used when reporting the role as missing, e.g. `EOI in Modon`.
    pub fn describe(&self, table_label: &str) -> String {
        format!("{} in {}", self, table_label)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::ReferenceKey => "Unit Number",
            ColumnRole::ReferenceInterest => "EOI",
            ColumnRole::TargetKey => "UnitID",
            ColumnRole::TargetStatus => "Status",
        })
    }
}
