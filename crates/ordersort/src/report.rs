use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::ReportError;

/// Appends diagnostic text files into a chosen directory. Surfacing them to
/// a user (dialog, console) is the caller's concern; this only writes.
pub struct ReportWriter {
    directory: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// `<prefix>_<run timestamp>.<extension>`, so repeated runs never clobber
    /// each other's diagnostics.
    pub fn timestamped_name(prefix: &str, extension: &str) -> String {
        format!(
            "{}_{}.{}",
            prefix,
            Local::now().format("%Y_%m_%d_%H_%M_%S"),
            extension
        )
    }

    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf, ReportError> {
        let path = self.directory.join(name);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| ReportError::WriteFile {
                path: path.clone(),
                source: e,
            })?;
        file.write_all(content.as_bytes())
            .map_err(|e| ReportError::WriteFile {
                path: path.clone(),
                source: e,
            })?;

        info!("Wrote diagnostic file {}", path.display());
        Ok(path)
    }
}
