//! Local asset cache on disk.
//!
//! Creates category directories on demand and replaces cached files atomically
//! (temp file in the same directory, then rename), so concurrent readers and
//! writers never observe a partially written asset.

mod writer;

pub use writer::{AtomicWriter, TEMP_SUFFIX};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cache path has no parent directory: {}", .0.display())]
    NoParent(PathBuf),
    #[error("failed to write cached asset {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move cached asset into place at {}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Filesystem-backed store rooted wherever the paths it is given point.
/// Holds no state of its own; the directory tree is the cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStore;

impl CacheStore {
    pub fn new() -> Self {
        CacheStore
    }

    /// Create the parent directory tree of `path`. Idempotent.
    pub fn ensure_directories(&self, path: &Path) -> Result<(), CacheError> {
        let parent = path
            .parent()
            .ok_or_else(|| CacheError::NoParent(path.to_path_buf()))?;
        std::fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })
    }

    /// True if a regular file is cached at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Start an atomic replacement of `path`. Parent directories must exist.
    pub fn begin(&self, path: &Path) -> Result<AtomicWriter, CacheError> {
        AtomicWriter::create(path)
    }

    /// Copy `reader` to `path` atomically, creating directories as needed.
    /// Returns the number of bytes written.
    #[cfg(test)]
    pub(crate) fn write_atomically<R: io::Read>(&self, path: &Path, mut reader: R) -> Result<u64, CacheError> {
        self.ensure_directories(path)?;
        let mut writer = self.begin(path)?;
        io::copy(&mut reader, &mut writer).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        writer.commit(None)
    }
}

#[cfg(test)]
mod tests;
