//! Dependency resolution: turn one declaration into a built artifact path.

use std::path::{Path, PathBuf};

use rivet_config::{DepDecl, DepMethod, META_FILE};

use crate::build::{build, BuildContext};
use crate::error::EngineError;

/// Resolve a single dependency declaration to a built artifact.
///
/// Dispatches on the declared method and recurses into [`build`] for every
/// resolved source tree, so a dependency's own dependencies are completely
/// built before the dependent is compiled. Declarations are not deduplicated:
/// two declarations resolving to the same source are built independently.
///
/// # Errors
/// Returns an error if the source cannot be obtained (download, extraction,
/// missing index row) or the recursive build fails. Every error is fatal for
/// the whole invocation.
pub fn resolve_dependency(ctx: &BuildContext, decl: &DepDecl) -> Result<PathBuf, EngineError> {
    match decl.method {
        DepMethod::Path => build(ctx, Path::new(&decl.location), Some(&decl.name), &[]),
        DepMethod::Local => build_from_archive(ctx, Path::new(&decl.location), &decl.name),
        DepMethod::Url => {
            let archive = ctx.cache.resolve(&decl.location)?;
            build_from_archive(ctx, &archive, &decl.name)
        }
        DepMethod::Ipfs => {
            // Gateway fetches carry no content verification at all.
            eprintln!(
                "warning: ipfs dependency `{}` is experimental — fetched content is not verified",
                decl.name
            );
            let url = format!(
                "{}/{}",
                ctx.ipfs_gateway.trim_end_matches('/'),
                decl.location
            );
            let archive = ctx.cache.resolve(&url)?;
            build_from_archive(ctx, &archive, &decl.name)
        }
        DepMethod::Index => resolve_from_index(ctx, decl),
    }
}

/// Extract an archive into a fresh temporary directory and build the package
/// inside it. The directory lives exactly as long as this call: it is removed
/// on return, including on failure.
fn build_from_archive(
    ctx: &BuildContext,
    archive: &Path,
    link_name: &str,
) -> Result<PathBuf, EngineError> {
    let tmp = tempfile::tempdir().map_err(|source| EngineError::ExtractDir {
        path: std::env::temp_dir().display().to_string(),
        source,
    })?;
    rivet_util::archive::extract_tar_gz(archive, tmp.path())?;
    let root = package_root(tmp.path())?;
    build(ctx, &root, Some(link_name), &[])
    // `tmp` drops here, deleting the extraction directory.
}

/// Locate the package root inside a fresh extraction directory.
///
/// Archives either hold the package files directly or wrap them in a single
/// top-level directory.
fn package_root(extracted: &Path) -> Result<PathBuf, EngineError> {
    if extracted.join(META_FILE).exists() {
        return Ok(extracted.to_path_buf());
    }

    let dirs: Vec<PathBuf> = std::fs::read_dir(extracted)
        .map_err(|source| EngineError::Io {
            path: extracted.display().to_string(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();

    if let [single] = dirs.as_slice() {
        if single.join(META_FILE).exists() {
            return Ok(single.clone());
        }
    }

    Err(EngineError::NoPackageInArchive {
        path: extracted.display().to_string(),
    })
}

/// Resolve a dependency through the remote package index.
///
/// The index document (fetched through the content cache) holds one
/// dependency-declaration line per row. The first row whose first token
/// equals the lookup key is re-parsed as a full declaration and resolved
/// recursively under the outer declaration's link name; the row may itself
/// use any method, including `index`. No matching row is fatal.
fn resolve_from_index(ctx: &BuildContext, decl: &DepDecl) -> Result<PathBuf, EngineError> {
    let index_path = ctx.cache.resolve(&ctx.index_url)?;
    let content = std::fs::read_to_string(&index_path).map_err(|source| EngineError::Io {
        path: index_path.display().to_string(),
        source,
    })?;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(first_token) = line.split_whitespace().next() else {
            continue;
        };
        if first_token != decl.location {
            continue;
        }

        let row = DepDecl::parse(line)?;
        // The outer declaration's name stays the link name; only the source
        // comes from the index row.
        let rewritten = DepDecl {
            name: decl.name.clone(),
            method: row.method,
            location: row.location,
        };
        return resolve_dependency(ctx, &rewritten);
    }

    Err(EngineError::NotInIndex {
        key: decl.location.clone(),
    })
}
