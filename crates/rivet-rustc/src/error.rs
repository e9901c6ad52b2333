//! Error types for rivet-rustc.

/// Errors produced while assembling or running a rustc invocation.
#[derive(Debug, thiserror::Error)]
pub enum RustcError {
    /// No entry file was set on the command builder.
    #[error("no entry file set for the compiler invocation")]
    NoEntry,

    /// No output path was set on the command builder.
    #[error("no output path set for the compiler invocation")]
    NoOutput,

    /// No crate name was set on the command builder.
    #[error("no crate name set for the compiler invocation")]
    NoCrateName,

    /// The `type` metadata key names an unknown crate type.
    #[error("unknown crate type `{value}` — expected `lib` or `bin`")]
    UnknownCrateType { value: String },

    /// The compiler process could not be spawned.
    #[error("{0}")]
    Exec(#[from] rivet_util::error::UtilError),
}
