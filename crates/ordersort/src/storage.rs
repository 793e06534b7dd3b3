use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::PlacementError;
use crate::router::RoutePlan;

/// Move a file from `src` to `dst`. Uses `rename` first (fast, atomic on
/// same filesystem) and falls back to copy + delete for cross-device moves.
fn move_file(src: &Path, dst: &Path) -> Result<(), PlacementError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    std::fs::copy(src, dst).map_err(|e| PlacementError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    std::fs::remove_file(src).map_err(|e| PlacementError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Outcome of one placement.
#[derive(Debug)]
pub struct Placement {
    pub path: PathBuf,
    /// Set when the planned name was taken and a `name_conflict_` prefix
    /// was applied to avoid overwriting.
    pub conflict_renamed: bool,
}

/// Executes [`RoutePlan`]s against a target root directory.
pub struct FilePlacer {
    target_dir: PathBuf,
}

impl FilePlacer {
    pub fn new<P: AsRef<Path>>(target_dir: P) -> Self {
        Self {
            target_dir: target_dir.as_ref().to_path_buf(),
        }
    }

    /// Creates the destination directory if needed, resolves name conflicts
    /// by prepending `name_conflict_` until the name is free, then copies or
    /// moves the source there.
    pub fn place(&self, source: &Path, plan: &RoutePlan) -> Result<Placement, PlacementError> {
        let directory = self.target_dir.join(&plan.directory);
        if !directory.exists() {
            std::fs::create_dir_all(&directory).map_err(|e| PlacementError::CreateDirectory {
                path: directory.clone(),
                source: e,
            })?;
        }

        let mut filename = plan.filename.clone();
        let mut conflict_renamed = false;
        while directory.join(&filename).exists() {
            filename = format!("name_conflict_{filename}");
            conflict_renamed = true;
        }
        if conflict_renamed {
            warn!(
                "File {} already exists in {}; renaming to {}",
                plan.filename,
                directory.display(),
                filename
            );
        }

        let destination = directory.join(&filename);
        if plan.copy {
            std::fs::copy(source, &destination).map_err(|e| PlacementError::CopyFile {
                from: source.to_path_buf(),
                to: destination.clone(),
                source: e,
            })?;
        } else {
            move_file(source, &destination)?;
        }

        debug!(
            "{} {} -> {}",
            if plan.copy { "Copied" } else { "Moved" },
            source.display(),
            destination.display()
        );

        Ok(Placement {
            path: destination,
            conflict_renamed,
        })
    }
}
