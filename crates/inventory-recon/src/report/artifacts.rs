//! Artifact naming and scoped cleanup.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp identifying one run, formatted `YYYYMMDD_HHMMSS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStamp(String);

impl RunStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now())
    }

    /// Stamp for a given moment.
    pub fn from_datetime(at: DateTime<Local>) -> Self {
        Self(at.format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Paths of the three discrepancy exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFiles {
    pub csv: PathBuf,
    pub excel: PathBuf,
    pub json: PathBuf,
}

impl ExportFiles {
    /// Pick `discrepancies_<stamp>[_n].{csv,xlsx,json}` in `dir`, avoiding existing files.
    pub fn allocate(dir: &Path, stamp: &RunStamp) -> Self {
        let base = format!("discrepancies_{}", stamp.as_str());
        let mut n = 0;
        loop {
            let stem = if n == 0 {
                base.clone()
            } else {
                format!("{}_{}", base, n)
            };
            let files = Self {
                csv: dir.join(format!("{}.csv", stem)),
                excel: dir.join(format!("{}.xlsx", stem)),
                json: dir.join(format!("{}.json", stem)),
            };
            if !files.iter().any(|p| p.exists()) {
                return files;
            }
            n += 1;
        }
    }

    /// The three paths in csv, excel, json order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [self.csv.as_path(), self.excel.as_path(), self.json.as_path()].into_iter()
    }
}

/// Everything a run wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifacts {
    /// Annotated copy of the target table.
    pub annotated: PathBuf,
    pub exports: ExportFiles,
    pub timestamp: RunStamp,
}

/// Removes the files it tracks on drop unless committed.
pub(crate) struct ArtifactGuard {
    written: Vec<PathBuf>,
    committed: bool,
}

impl ArtifactGuard {
    pub(crate) fn new() -> Self {
        Self {
            written: Vec::new(),
            committed: false,
        }
    }

    pub(crate) fn track(&mut self, path: &Path) {
        self.written.push(path.to_path_buf());
    }

    pub(crate) fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.written {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial artifact"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_stamp_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(RunStamp::from_datetime(at).as_str(), "20240307_090502");
    }

    #[test]
    fn test_allocate_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let stamp = RunStamp("20240101_000000".to_string());

        let first = ExportFiles::allocate(dir.path(), &stamp);
        assert!(first.csv.ends_with("discrepancies_20240101_000000.csv"));

        fs::write(&first.json, "{}").unwrap();
        let second = ExportFiles::allocate(dir.path(), &stamp);
        assert!(second.excel.ends_with("discrepancies_20240101_000000_1.xlsx"));
    }

    #[test]
    fn test_guard_removes_uncommitted_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kept.txt");
        let dropped = dir.path().join("dropped.txt");
        fs::write(&kept, "x").unwrap();
        fs::write(&dropped, "x").unwrap();

        let mut guard = ArtifactGuard::new();
        guard.track(&kept);
        guard.commit();

        {
            let mut guard = ArtifactGuard::new();
            guard.track(&dropped);
        }

        assert!(kept.exists());
        assert!(!dropped.exists());
    }
}
