//! Input loading: spreadsheets and delimited text into a `Table`.

mod loader;
mod source;

pub use loader::{DEFAULT_NA_TOKENS, InputFormat, LoaderConfig, TableLoader, normalize_headers};
pub use source::{CellValue, SourceMetadata, Table};
