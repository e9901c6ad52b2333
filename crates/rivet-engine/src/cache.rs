//! Content cache mapping URLs to files under a process-wide cache root.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::EngineError;

/// Default freshness window for cached downloads (24 hours).
pub const DEFAULT_TTL: Duration = Duration::from_secs(86400);

/// Maps a URL to `cache_root/<sha256(url)>`, fetching on miss or staleness.
///
/// There is no entry metadata beyond file existence and mtime, and no explicit
/// eviction: a stale entry is simply overwritten by the next fetch. The cache
/// directory is an unsynchronized shared resource; concurrent invocations of
/// the tool are not coordinated.
#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
    ttl: Duration,
}

impl ContentCache {
    /// Create a cache over `root` with the given freshness window.
    pub fn new(root: PathBuf, ttl: Duration) -> Self {
        Self { root, ttl }
    }

    /// Create a cache at the default root (`${XDG_CACHE_HOME:-~/.cache}/rivet`)
    /// with the default ttl.
    ///
    /// # Errors
    /// Returns an error if no home directory can be determined.
    pub fn from_env() -> Result<Self, EngineError> {
        Ok(Self::new(rivet_util::fs::cache_root()?, DEFAULT_TTL))
    }

    /// The on-disk path a URL maps to, whether or not it is populated.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.root.join(rivet_util::hash::sha256_str(url))
    }

    /// Resolve a URL to a local file, downloading unless a fresh entry exists.
    ///
    /// A fresh entry (younger than the ttl) is returned without touching the
    /// network. Otherwise the URL is fetched over the stale entry.
    ///
    /// # Errors
    /// Returns an error if the cache root cannot be created or the download
    /// fails. A failed download leaves no cache entry behind.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, EngineError> {
        let path = self.entry_path(url);
        rivet_util::fs::ensure_dir(&self.root)?;

        if is_fresh(&path, self.ttl) {
            return Ok(path);
        }

        rivet_util::download::fetch(url, &path)?;
        Ok(path)
    }
}

/// Whether a cache entry exists and its mtime is younger than `ttl`.
fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    // An mtime in the future reads as fresh rather than forcing a refetch.
    modified.elapsed().map(|age| age < ttl).unwrap_or(true)
}
