//! Reconciliation: reference index, target scan and discrepancy records.

mod engine;
mod record;

pub use engine::{ReconcileOutcome, ReconcileStats, Reconciler, ReferenceIndex, is_available, unit_key};
pub use record::{AnnotatedRow, AnnotatedTable, Discrepancy, Fill, REFERENCE_STATUS};
