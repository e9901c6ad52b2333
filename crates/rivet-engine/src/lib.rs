//! Build orchestration, dependency resolution, and download caching for rivet.

pub mod build;
pub mod cache;
pub mod clean;
pub mod error;
pub mod package;
pub mod resolve;

pub use build::{build, identity_hash, BuildContext, OUT_DIR};
pub use cache::{ContentCache, DEFAULT_TTL};
pub use clean::clean;
pub use error::EngineError;
pub use package::package;
pub use resolve::resolve_dependency;
