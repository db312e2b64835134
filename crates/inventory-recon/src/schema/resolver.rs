//! Locates semantic columns by fuzzy header matching.
//!
//! Each role takes the first column, in table order, whose lowercased
//! name contains one of the role's markers. Later matches are ignored, so
//! a sheet with both `EOI Notes` and `EOI` resolves to `EOI Notes`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::role::{ColumnRole, TableSide};
use crate::error::{ReconError, Result};
use crate::input::Table;

/// A role bound to a concrete column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    /// Header text as it appears in the table.
    pub name: String,
    /// Position in the table.
    pub index: usize,
}

/// Columns needed from the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceColumns {
    pub key: ResolvedColumn,
    pub interest: ResolvedColumn,
}

/// Columns needed from the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetColumns {
    pub key: ResolvedColumn,
    pub status: ResolvedColumn,
}

/// Resolve roles against one table; unmatched roles map to `None`.
pub fn resolve_roles(
    table: &Table,
    roles: impl IntoIterator<Item = ColumnRole>,
) -> IndexMap<ColumnRole, Option<ResolvedColumn>> {
    roles
        .into_iter()
        .map(|role| {
            let found = table
                .columns
                .iter()
                .enumerate()
                .find(|(_, name)| role.matches(name))
                .map(|(index, name)| ResolvedColumn {
                    name: name.clone(),
                    index,
                });
            (role, found)
        })
        .collect()
}

/// Resolves the four required columns across both tables.
pub struct ColumnResolver<'a> {
    reference_label: &'a str,
    target_label: &'a str,
}

impl<'a> ColumnResolver<'a> {
    /// Create a resolver; labels are used in missing-column messages.
    pub fn new(reference_label: &'a str, target_label: &'a str) -> Self {
        Self {
            reference_label,
            target_label,
        }
    }

    /// Resolve every role, or report all that are missing at once.
    pub fn resolve(
        &self,
        reference: &Table,
        target: &Table,
    ) -> Result<(ReferenceColumns, TargetColumns)> {
        let mut resolved = resolve_roles(reference, ColumnRole::for_side(TableSide::Reference));
        resolved.extend(resolve_roles(target, ColumnRole::for_side(TableSide::Target)));

        let get = |role: ColumnRole| resolved.get(&role).cloned().flatten();

        let (reference_columns, target_columns) = match (
            get(ColumnRole::ReferenceKey),
            get(ColumnRole::ReferenceInterest),
            get(ColumnRole::TargetKey),
            get(ColumnRole::TargetStatus),
        ) {
            (Some(key), Some(interest), Some(target_key), Some(status)) => (
                ReferenceColumns { key, interest },
                TargetColumns {
                    key: target_key,
                    status,
                },
            ),
            _ => {
                let missing = resolved
                    .iter()
                    .filter(|(_, column)| column.is_none())
                    .map(|(role, _)| role.describe(self.label(role.side())))
                    .collect();
                return Err(ReconError::MissingColumns {
                    missing,
                    reference_columns: reference.columns.clone(),
                    target_columns: target.columns.clone(),
                });
            }
        };

        tracing::debug!(
            reference_key = %reference_columns.key.name,
            reference_interest = %reference_columns.interest.name,
            target_key = %target_columns.key.name,
            target_status = %target_columns.status.name,
            "resolved columns"
        );

        Ok((reference_columns, target_columns))
    }

    fn label(&self, side: TableSide) -> &str {
        match side {
            TableSide::Reference => self.reference_label,
            TableSide::Target => self.target_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str]) -> Table {
        Table::new(columns.iter().map(|c| c.to_string()).collect(), vec![])
    }

    #[test]
    fn test_first_match_wins() {
        let reference = table(&["Unit Number", "EOI Notes", "EOI"]);
        let resolved = resolve_roles(&reference, [ColumnRole::ReferenceInterest]);
        let column = resolved[&ColumnRole::ReferenceInterest].as_ref().unwrap();
        assert_eq!(column.name, "EOI Notes");
        assert_eq!(column.index, 1);
    }

    #[test]
    fn test_resolve_all_roles() {
        let reference = table(&["Project", "Unit Number", "EOI Customer"]);
        let target = table(&["Unit ID", "Unit Status", "Price"]);

        let (ref_cols, target_cols) = ColumnResolver::new("Modon", "Sakneen")
            .resolve(&reference, &target)
            .unwrap();

        assert_eq!(ref_cols.key.name, "Unit Number");
        assert_eq!(ref_cols.interest.name, "EOI Customer");
        assert_eq!(target_cols.key.index, 0);
        assert_eq!(target_cols.status.name, "Unit Status");
    }

    #[test]
    fn test_missing_columns_lists_roles_and_headers() {
        let reference = table(&["Unit Number", "EOI"]);
        let target = table(&["UnitID", "Price"]);

        let err = ColumnResolver::new("Modon", "Sakneen")
            .resolve(&reference, &target)
            .unwrap_err();

        match err {
            ReconError::MissingColumns {
                missing,
                reference_columns,
                target_columns,
            } => {
                assert_eq!(missing, vec!["Status in Sakneen"]);
                assert_eq!(reference_columns, vec!["Unit Number", "EOI"]);
                assert_eq!(target_columns, vec!["UnitID", "Price"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
