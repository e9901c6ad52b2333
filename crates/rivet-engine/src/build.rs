//! Build orchestration: load metadata, resolve dependencies, invoke rustc.

use std::path::{Path, PathBuf};

use rivet_config::{DepDecl, Metadata, META_FILE};
use rivet_rustc::{sanitize_crate_name, CrateType, RustcCommand, LIB_EXT};

use crate::cache::ContentCache;
use crate::error::EngineError;
use crate::resolve::resolve_dependency;

/// Name of the shared build output directory under the project root.
pub const OUT_DIR: &str = "out";

/// Default URL of the remote package index.
pub const DEFAULT_INDEX_URL: &str = "https://pkg.rivet-build.dev/index";

/// Default IPFS gateway used for content-addressed fetches.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs";

/// Process-wide configuration for one build invocation.
///
/// Constructed once at the top level and passed explicitly into every
/// recursive call; treated as read-only for the duration of the invocation.
#[derive(Debug)]
pub struct BuildContext {
    /// Shared output directory for every artifact in the dependency graph.
    pub out_dir: PathBuf,
    /// Cache for remote downloads.
    pub cache: ContentCache,
    /// URL of the package index document.
    pub index_url: String,
    /// Gateway base URL for `ipfs` dependencies.
    pub ipfs_gateway: String,
    /// Whether to show raw compiler output for successful builds.
    pub verbose: bool,
}

impl BuildContext {
    /// Build a context for the project at `project_root`.
    ///
    /// The output directory is `<project_root>/out`, created if needed. The
    /// index URL and IPFS gateway come from `RIVET_INDEX_URL` and
    /// `IPFS_GATEWAY`, falling back to the public defaults.
    ///
    /// # Errors
    /// Returns an error if the output directory cannot be created or the
    /// cache root cannot be determined.
    pub fn new(project_root: &Path, verbose: bool) -> Result<Self, EngineError> {
        let out_dir = project_root.join(OUT_DIR);
        rivet_util::fs::ensure_dir(&out_dir)?;
        let out_dir = std::fs::canonicalize(&out_dir).map_err(|source| EngineError::Io {
            path: out_dir.display().to_string(),
            source,
        })?;

        Ok(Self {
            out_dir,
            cache: ContentCache::from_env()?,
            index_url: env_or("RIVET_INDEX_URL", DEFAULT_INDEX_URL),
            ipfs_gateway: env_or("IPFS_GATEWAY", DEFAULT_IPFS_GATEWAY),
            verbose,
        })
    }
}

fn env_or(var: &str, default: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_owned(),
    }
}

/// Identity hash of one build: `"r"` + the first 16 hex chars of
/// SHA-256(`<absolute path>:<override name>`).
///
/// Disambiguates differently-named builds of the same package within one
/// dependency graph, and names library artifacts. The prefix keeps the hash a
/// valid rustc crate identifier (hex may start with a digit).
pub fn identity_hash(source_root: &Path, override_name: Option<&str>) -> String {
    let input = format!(
        "{}:{}",
        source_root.display(),
        override_name.unwrap_or("")
    );
    let digest = rivet_util::hash::sha256_str(&input);
    let short = digest.get(..16).unwrap_or(&digest);
    format!("r{short}")
}

/// The artifact path a build produces: `lib<hash>.rlib` for libraries,
/// `<name>` for binaries, both under the shared output directory.
pub fn artifact_path(out_dir: &Path, crate_type: CrateType, name: &str, hash: &str) -> PathBuf {
    match crate_type {
        CrateType::Lib => out_dir.join(format!("lib{hash}.{LIB_EXT}")),
        CrateType::Bin => out_dir.join(name),
    }
}

/// Build the package rooted at `source_root` and return its artifact path.
///
/// Loads the package metadata, resolves every declared dependency in
/// declaration order (recursing through [`resolve_dependency`]), assembles the
/// compiler invocation, and runs it with `source_root` as the working
/// directory. The caller is responsible for checking that the metadata file
/// exists before the top-level call; here a missing file surfaces as a read
/// error.
///
/// # Errors
/// Returns an error on the first failure anywhere in the recursive
/// resolution: unreadable metadata, a malformed or unresolvable dependency, a
/// failed download or extraction, or a non-zero compiler exit.
pub fn build(
    ctx: &BuildContext,
    source_root: &Path,
    override_name: Option<&str>,
    extra_flags: &[String],
) -> Result<PathBuf, EngineError> {
    let source_root = std::fs::canonicalize(source_root).map_err(|source| EngineError::Io {
        path: source_root.display().to_string(),
        source,
    })?;

    let hash = identity_hash(&source_root, override_name);
    let metadata = Metadata::from_path(&source_root.join(META_FILE))?;

    let name = match override_name {
        Some(name) => name.to_owned(),
        None => metadata
            .first("name")
            .map(str::to_owned)
            .ok_or_else(|| EngineError::MissingName {
                path: source_root.display().to_string(),
            })?,
    };
    let crate_type = CrateType::parse(metadata.first_or("type", "bin"))?;
    let edition = metadata.first_or("edition", "2018");
    let entry = metadata.first_or("entry", "main.rs");

    // Resolve dependencies depth-first, in declaration order. Link flag order
    // mirrors declaration order.
    let mut externs: Vec<(String, PathBuf)> = Vec::new();
    for dep_line in metadata.all("dep") {
        let decl = DepDecl::parse(dep_line)?;
        let artifact = resolve_dependency(ctx, &decl)?;
        externs.push((decl.name, artifact));
    }

    let output = artifact_path(&ctx.out_dir, crate_type, &name, &hash);
    eprintln!("    Compiling {name} \u{2192} {}", output.display());

    let crate_name = match crate_type {
        // Hash-named library crates cannot collide in the shared out dir.
        CrateType::Lib => hash.clone(),
        CrateType::Bin => sanitize_crate_name(&name),
    };

    let result = RustcCommand::new()
        .entry(Path::new(entry))
        .crate_name(&crate_name)
        .crate_type(crate_type)
        .metadata(&hash)
        .edition(edition)
        .output(&output)
        .search_path(&ctx.out_dir)
        .externs(&externs)
        .extra_flags(extra_flags)
        .optimize(true)
        .execute(&source_root)?;

    if !result.success {
        eprint!("{}", result.stderr);
        return Err(EngineError::CompileFailed {
            name,
            exit_code: result.exit_code,
        });
    }
    if ctx.verbose && !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }

    Ok(output)
}
