//! Streaming writer that lands a file at its destination in one rename.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

use super::CacheError;

/// Suffix of in-progress temporary files, next to their destination.
pub const TEMP_SUFFIX: &str = ".part";

/// Writes into a hidden sibling temp file (`.{name}.XXXXXX.part`) and renames it
/// over the destination on `commit`. Dropping without `commit` deletes the temp
/// file, so an aborted download never leaves anything behind.
pub struct AtomicWriter {
    temp: NamedTempFile,
    dest: PathBuf,
    written: u64,
}

impl AtomicWriter {
    /// Create the temp file in `dest`'s directory, which must already exist.
    pub(crate) fn create(dest: &Path) -> Result<Self, CacheError> {
        let parent = dest
            .parent()
            .ok_or_else(|| CacheError::NoParent(dest.to_path_buf()))?;
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        let temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", name))
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)
            .map_err(|source| CacheError::Write {
                path: dest.to_path_buf(),
                source,
            })?;
        Ok(Self {
            temp,
            dest: dest.to_path_buf(),
            written: 0,
        })
    }

    /// Append a chunk of the body.
    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.temp.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path of the in-progress temp file.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Flush, sync, optionally stamp the modification time, then rename over
    /// the destination. Readers see either the previous file or this one.
    pub fn commit(mut self, modified: Option<SystemTime>) -> Result<u64, CacheError> {
        let dest = self.dest.clone();
        let write_err = |source| CacheError::Write {
            path: dest.clone(),
            source,
        };
        self.temp.flush().map_err(write_err)?;
        {
            let file: &File = self.temp.as_file();
            if let Some(mtime) = modified {
                file.set_modified(mtime).map_err(write_err)?;
            }
            file.sync_all().map_err(write_err)?;
        }
        let written = self.written;
        self.temp
            .persist(&self.dest)
            .map_err(|e| CacheError::Persist {
                path: self.dest.clone(),
                source: e.error,
            })?;
        Ok(written)
    }
}

impl Write for AtomicWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.temp.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}
