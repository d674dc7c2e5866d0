//! Temp file lifecycle for file-output runs.
//!
//! The engine is handed an extensionless base path and writes `<base>.<ext>`
//! next to it. Both files belong to one run and are removed together, whether
//! the run succeeded or failed.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Removes a run's temp files when dropped.
#[derive(Debug, Default)]
pub struct TempArtifacts {
    paths: Vec<PathBuf>,
}

impl TempArtifacts {
    /// Guard for the reserved base path and the extensioned result path.
    #[must_use]
    pub fn new(base: PathBuf, with_ext: PathBuf) -> Self {
        let mut paths = vec![base];
        if paths[0] != with_ext {
            paths.push(with_ext);
        }
        Self { paths }
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Stop tracking `path`, e.g. after it was moved to its final location.
    pub fn release(&mut self, path: &Path) {
        self.paths.retain(|tracked| tracked != path);
    }

    /// Remove every tracked file now.
    ///
    /// Files that are already gone are fine. Other failures are logged and
    /// the remaining files are still attempted.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed temp artifact"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove temp artifact"
                ),
            }
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}
