//! Error types for rivet-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// An I/O operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A command failed to execute.
    #[error("cannot execute `{command}`: {source}")]
    CommandExec {
        command: String,
        source: std::io::Error,
    },

    /// A download failed.
    #[error("download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// An archive could not be read or written.
    #[error("archive error at {path}: {message}")]
    Archive { path: String, message: String },

    /// An archive entry attempts to escape the extraction directory.
    #[error("archive entry `{entry}` escapes the extraction directory {dest}")]
    PathTraversal { entry: String, dest: String },

    /// Cannot determine the user's home directory.
    #[error("cannot determine home directory — set the HOME environment variable")]
    NoHomeDir,
}
