//! Remove build outputs.

use std::path::Path;

use crate::build::OUT_DIR;
use crate::error::EngineError;

/// Delete the build output directory of the project at `project_root`.
///
/// A missing output directory is not an error; the download cache is left
/// untouched.
///
/// # Errors
/// Returns an error if the directory exists but cannot be removed.
pub fn clean(project_root: &Path) -> Result<(), EngineError> {
    rivet_util::fs::remove_dir_all_if_exists(&project_root.join(OUT_DIR))?;
    Ok(())
}
