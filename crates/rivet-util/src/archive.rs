//! Creation and extraction of `.tar.gz` package archives.

use std::path::Path;

use crate::error::UtilError;
use crate::fs::ensure_dir;

/// Extract a `.tar.gz` archive into `dest`.
///
/// Each entry's path is validated to ensure it stays within `dest`,
/// rejecting path-traversal entries from malicious archives.
///
/// # Errors
/// Returns an error if the archive cannot be opened or read, an entry escapes
/// the destination, or an entry cannot be unpacked.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), UtilError> {
    ensure_dir(dest)?;
    let canonical_dest = std::fs::canonicalize(dest).map_err(|source| UtilError::Io {
        path: dest.display().to_string(),
        source,
    })?;

    let file = std::fs::File::open(archive_path).map_err(|source| UtilError::Io {
        path: archive_path.display().to_string(),
        source,
    })?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    let entries = archive.entries().map_err(|e| UtilError::Archive {
        path: archive_path.display().to_string(),
        message: e.to_string(),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| UtilError::Archive {
            path: archive_path.display().to_string(),
            message: e.to_string(),
        })?;

        let entry_path = entry.path().map_err(|e| UtilError::Archive {
            path: archive_path.display().to_string(),
            message: e.to_string(),
        })?;

        for component in entry_path.components() {
            if matches!(component, std::path::Component::ParentDir) {
                return Err(UtilError::PathTraversal {
                    entry: entry_path.display().to_string(),
                    dest: canonical_dest.display().to_string(),
                });
            }
        }

        let target = canonical_dest.join(&*entry_path);
        if !target.starts_with(&canonical_dest) {
            return Err(UtilError::PathTraversal {
                entry: entry_path.display().to_string(),
                dest: canonical_dest.display().to_string(),
            });
        }

        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }

        entry.unpack(&target).map_err(|e| UtilError::Archive {
            path: archive_path.display().to_string(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Create a `.tar.gz` archive at `dest` from the top-level contents of `src_dir`.
///
/// Entries whose top-level file name appears in `exclude` are skipped (used to
/// keep build output and the archive itself out of a package tarball). Paths
/// inside the archive are relative to `src_dir`.
///
/// # Errors
/// Returns an error if `src_dir` cannot be read or the archive cannot be written.
pub fn create_tar_gz(src_dir: &Path, dest: &Path, exclude: &[&str]) -> Result<(), UtilError> {
    let file = std::fs::File::create(dest).map_err(|source| UtilError::Io {
        path: dest.display().to_string(),
        source,
    })?;
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let entries = std::fs::read_dir(src_dir).map_err(|source| UtilError::Io {
        path: src_dir.display().to_string(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| UtilError::Io {
            path: src_dir.display().to_string(),
            source,
        })?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if exclude.iter().any(|ex| *ex == name_str) {
            continue;
        }

        let path = entry.path();
        let result = if path.is_dir() {
            builder.append_dir_all(name_str.as_ref(), &path)
        } else {
            builder.append_path_with_name(&path, name_str.as_ref())
        };
        result.map_err(|e| UtilError::Archive {
            path: dest.display().to_string(),
            message: e.to_string(),
        })?;
    }

    let encoder = builder.into_inner().map_err(|e| UtilError::Archive {
        path: dest.display().to_string(),
        message: e.to_string(),
    })?;
    encoder.finish().map_err(|e| UtilError::Archive {
        path: dest.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}
