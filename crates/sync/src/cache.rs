//! Response cache invalidation after route changes.
//!
//! Cached pages embed links built from the route table, so every route
//! mutation clears them.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// File kept in cache directories so they survive version control.
const PLACEHOLDER_FILE: &str = "empty";

/// Something that can drop cached responses.
pub trait CacheInvalidator: Send + Sync {
    /// Clear the cache, returning how many entries were removed.
    fn invalidate(&self) -> impl Future<Output = io::Result<usize>> + Send;
}

/// No cache configured: invalidation is a no-op.
impl<C: CacheInvalidator> CacheInvalidator for Option<C> {
    async fn invalidate(&self) -> io::Result<usize> {
        match self {
            Some(cache) => cache.invalidate().await,
            None => Ok(0),
        }
    }
}

/// A directory of cached rendered views.
///
/// Invalidation removes every regular file directly inside the directory
/// except the `empty` placeholder. Subdirectories are left alone. A missing
/// directory counts as an empty cache.
#[derive(Debug, Clone)]
pub struct ViewCacheDir {
    dir: PathBuf,
}

impl ViewCacheDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl CacheInvalidator for ViewCacheDir {
    async fn invalidate(&self) -> io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() == PLACEHOLDER_FILE {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }

        tracing::debug!(dir = %self.dir.display(), removed, "View cache cleared");
        Ok(removed)
    }
}
