//! Error types for rivet-engine.

/// Errors produced by engine operations.
///
/// Every variant is fatal for the invocation that produced it: the first
/// failure anywhere in the recursive resolution aborts the whole build, and
/// artifacts already written stay on disk.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A filesystem operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A utility operation (download, archive, process) failed.
    #[error("{0}")]
    Util(#[from] rivet_util::error::UtilError),

    /// The metadata file could not be loaded.
    #[error("{0}")]
    Metadata(#[from] rivet_config::MetadataError),

    /// A dependency declaration could not be parsed.
    #[error("{0}")]
    DepParse(#[from] rivet_config::DepParseError),

    /// A compiler invocation could not be assembled or spawned.
    #[error("{0}")]
    Rustc(#[from] rivet_rustc::RustcError),

    /// The compiler exited with a non-zero status.
    #[error("compilation of `{name}` failed (rustc exited with status {status})", status = .exit_code.map_or(-1, |c| c))]
    CompileFailed {
        name: String,
        exit_code: Option<i32>,
    },

    /// The package declares no name and no override was supplied.
    #[error("package at {path} has no `name` entry in its metadata")]
    MissingName { path: String },

    /// A scratch directory for archive extraction could not be created.
    #[error("cannot create extraction directory under {path}: {source}")]
    ExtractDir {
        path: String,
        source: std::io::Error,
    },

    /// A dependency archive contains no package root.
    #[error("archive extracted to {path} contains no {meta} file", meta = rivet_config::META_FILE)]
    NoPackageInArchive { path: String },

    /// An index lookup key matched no row in the index document.
    #[error("dependency `{key}` not found in the package index")]
    NotInIndex { key: String },
}
