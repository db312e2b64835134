//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use inventory_recon::TableSide;
use inventory_recon::config::{REFERENCE_HEADER_ROW, TARGET_HEADER_ROW};

/// inventory-recon: reconcile unit availability against EOI records
#[derive(Parser)]
#[command(name = "inventory-recon")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a Modon export against a Sakneen export
    Compare {
        /// Reference (Modon) export with unit numbers and EOIs
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,

        /// Target (Sakneen) export with unit ids and statuses
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Directory for the annotated workbook and discrepancy exports
        #[arg(short, long, default_value = "uploads")]
        output_dir: PathBuf,

        /// Zero-based header row of the reference export
        #[arg(long, default_value_t = REFERENCE_HEADER_ROW)]
        reference_header_row: usize,

        /// Zero-based header row of the target export
        #[arg(long, default_value_t = TARGET_HEADER_ROW)]
        target_header_row: usize,

        /// Print the JSON result record instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the columns of an export and which roles they resolve to
    Inspect {
        /// Path to the export (xlsx, xls, ods, csv, tsv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Zero-based header row (default: the role's usual offset)
        #[arg(long)]
        header_row: Option<usize>,

        /// Which side of the comparison the file is
        #[arg(short, long, default_value = "reference")]
        role: RoleChoice,
    },

    /// Start the upload web server
    Serve {
        /// Port for web server
        #[arg(short, long, env = "PORT", default_value = "5002")]
        port: u16,

        /// Directory for staged uploads and generated files
        #[arg(short, long, default_value = "uploads")]
        dir: PathBuf,

        /// Maximum request size in MiB
        #[arg(long, default_value_t = 16)]
        max_upload_mb: usize,

        /// Open the upload page in a browser
        #[arg(long)]
        open: bool,
    },
}

/// Side of the comparison for `inspect`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleChoice {
    /// Modon export
    Reference,
    /// Sakneen export
    Target,
}

impl From<RoleChoice> for TableSide {
    fn from(choice: RoleChoice) -> Self {
        match choice {
            RoleChoice::Reference => TableSide::Reference,
            RoleChoice::Target => TableSide::Target,
        }
    }
}
