//! Inventory availability reconciliation.
//!
//! Two exports describe the same real-estate units: a reference system of
//! record that tracks expressions of interest (EOI), and a target system that
//! markets units. This crate joins them on the unit identifier and flags every
//! target row that shows a unit as available while the reference holds an EOI
//! for it.
//!
//! The pipeline runs strictly forward:
//!
//! - **Load** each input into a [`Table`] using a fixed header-row offset.
//! - **Resolve** the unit, EOI and status columns by fuzzy header matching.
//! - **Reconcile** the target against a unit -> EOI index of the reference.
//! - **Report** an annotated copy of the target plus CSV, XLSX and JSON
//!   discrepancy exports.
//!
//! # Example
//!
//! ```no_run
//! use inventory_recon::{InventoryRecon, ReconConfig};
//!
//! let engine = InventoryRecon::with_config(ReconConfig::new().with_output_dir("out"));
//! let report = engine
//!     .try_run_files("modon.xlsx".as_ref(), "sakneen.xlsx".as_ref())
//!     .unwrap();
//!
//! println!("Discrepancies: {}", report.discrepancies.len());
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod reconcile;
pub mod report;
pub mod schema;

mod recon;

pub use crate::recon::{
    InputFile, InventoryRecon, ReconFailure, ReconReport, ReconResponse, ReconSuccess,
};
pub use config::{OutputConfig, ReconConfig, SourceConfig};
pub use error::{ErrorKind, ReconError, Result};
pub use input::{CellValue, InputFormat, LoaderConfig, SourceMetadata, Table, TableLoader};
pub use reconcile::{AnnotatedTable, Discrepancy, ReconcileStats, Reconciler, REFERENCE_STATUS};
pub use report::{DiscrepancyDocument, ExportFiles, ReportArtifacts, ReportWriter, RunStamp};
pub use schema::{ColumnResolver, ColumnRole, TableSide};
