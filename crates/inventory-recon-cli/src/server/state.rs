//! Application state for the web server.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use inventory_recon::{InventoryRecon, ReconConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Engine writing into `upload_dir`.
    pub recon: Arc<InventoryRecon>,
    /// Directory for staged uploads and generated files.
    pub upload_dir: PathBuf,
    /// Maximum accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Held for the whole run; the annotated workbook has a fixed name.
    pub run_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(upload_dir: PathBuf, max_upload_bytes: usize) -> Self {
        let config = ReconConfig::new().with_output_dir(&upload_dir);
        Self {
            recon: Arc::new(InventoryRecon::with_config(config)),
            upload_dir,
            max_upload_bytes,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Resolve a generated file by bare name, rejecting anything path-like.
    pub fn artifact_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return None;
        }
        if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
            return None;
        }

        let path = self.upload_dir.join(name);
        path.is_file().then_some(path)
    }
}
