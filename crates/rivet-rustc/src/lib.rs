//! rustc invocation layer for rivet.

pub mod error;
pub mod invoke;

pub use error::RustcError;
pub use invoke::{sanitize_crate_name, CompilationResult, CrateType, RustcCommand, LIB_EXT};
