//! Create a distributable source archive of a project.

use std::path::{Path, PathBuf};

use rivet_config::{Metadata, META_FILE};

use crate::build::OUT_DIR;
use crate::error::EngineError;

/// Archive the project at `project_root` into a gzipped tarball.
///
/// The destination defaults to `<name>.tar.gz` inside the project root, where
/// `name` comes from the package metadata. The build output directory and the
/// archive file itself are excluded, so packaging is idempotent.
///
/// # Errors
/// Returns an error if the metadata cannot be read, declares no name while no
/// explicit output path was given, or the archive cannot be written.
pub fn package(project_root: &Path, output: Option<PathBuf>) -> Result<PathBuf, EngineError> {
    let dest = match output {
        Some(path) => path,
        None => {
            let metadata = Metadata::from_path(&project_root.join(META_FILE))?;
            let name = metadata
                .first("name")
                .ok_or_else(|| EngineError::MissingName {
                    path: project_root.display().to_string(),
                })?;
            project_root.join(format!("{name}.tar.gz"))
        }
    };

    let mut exclude = vec![OUT_DIR];
    // The archive excludes itself only when it is written into the project
    // root; an unrelated project file sharing the name of an external
    // destination must stay in the archive.
    if dest_in_dir(&dest, project_root) {
        if let Some(file_name) = dest.file_name().and_then(|n| n.to_str()) {
            exclude.push(file_name);
        }
    }

    rivet_util::archive::create_tar_gz(project_root, &dest, &exclude)?;
    Ok(dest)
}

/// Whether `dest` names a direct child of `dir`. The destination file itself
/// need not exist yet; an empty parent means the current directory.
fn dest_in_dir(dest: &Path, dir: &Path) -> bool {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    match (std::fs::canonicalize(&parent), std::fs::canonicalize(dir)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
