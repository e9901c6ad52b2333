//! Package metadata and dependency declarations for rivet.

pub mod dep;
pub mod metadata;

pub use dep::{DepDecl, DepMethod, DepParseError};
pub use metadata::{Metadata, MetadataError, META_FILE};
