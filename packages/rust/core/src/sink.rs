//! Durable destination for the latest report.

use std::fs;
use std::path::{Path, PathBuf};

use legalwatch_shared::{LegalWatchError, Result};
use tracing::debug;
use uuid::Uuid;

/// Writes the report to a single file, replacing the previous one.
///
/// The text goes to a temporary sibling first and is renamed over the
/// target, so readers see either the old report or the new one. Every
/// write gets its own temporary name, so concurrent writers from other
/// processes never rename each other's files.
#[derive(Debug, Clone)]
pub struct ReportSink {
    path: PathBuf,
}

impl ReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the report file with `text`.
    pub fn write(&self, text: &str) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| LegalWatchError::io(parent, e))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                LegalWatchError::validation(format!(
                    "report path has no file name: {}",
                    self.path.display()
                ))
            })?
            .to_string_lossy();
        let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::now_v7()));

        fs::write(&tmp, text).map_err(|e| LegalWatchError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(LegalWatchError::io(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = text.len(), "report written");
        Ok(())
    }
}
