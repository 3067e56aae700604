//! Remote asset download into the local cache.
//!
//! A download streams a single GET straight into an `AtomicWriter`. Only a
//! final HTTP 200 produces a file; every other status, and every transport
//! error, leaves the cache untouched.

mod curl_client;
mod parse;
mod transport;

pub use curl_client::{ClientOptions, CurlClient};
pub use transport::{
    classify_curl_error, GetResponse, HeadResult, HttpTransport, TransportError,
    TransportErrorKind,
};

use crate::storage::{AtomicWriter, CacheError, CacheStore};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

/// Result of one download attempt against one source.
#[derive(Debug)]
pub enum FetchOutcome {
    /// HTTP 200; the body is now the cached file.
    Success { bytes: u64 },
    /// Any final status other than 200. Nothing was written.
    NotFound { status: u32 },
    /// DNS, connect, timeout or stream failure. Nothing was written.
    TransportFailure(TransportError),
    /// The cache directory could not be created or written.
    StorageFailure(CacheError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Downloads remote assets through a shared transport.
#[derive(Clone)]
pub struct RemoteFetcher {
    transport: Arc<dyn HttpTransport>,
    store: CacheStore,
}

impl RemoteFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, store: CacheStore) -> Self {
        Self { transport, store }
    }

    /// GET `remote` and atomically replace `dest` with the body on HTTP 200.
    ///
    /// Never panics on network or disk trouble; every failure is an outcome.
    pub fn download(&self, remote: &Url, dest: &Path) -> FetchOutcome {
        if let Err(e) = self.store.ensure_directories(dest) {
            tracing::warn!(path = %dest.display(), "cannot prepare cache directory: {}", e);
            return FetchOutcome::StorageFailure(e);
        }

        tracing::info!(url = %remote, "downloading asset");
        let mut writer: Option<AtomicWriter> = None;
        let mut storage_err: Option<CacheError> = None;
        let store = self.store;
        let res = self.transport.get(remote, &mut |status, chunk| {
            if status != 200 {
                return Ok(());
            }
            if writer.is_none() {
                match store.begin(dest) {
                    Ok(w) => writer = Some(w),
                    Err(e) => {
                        let msg = e.to_string();
                        storage_err = Some(e);
                        return Err(io::Error::new(io::ErrorKind::Other, msg));
                    }
                }
            }
            match writer.as_mut() {
                Some(w) => w.write_chunk(chunk),
                None => Ok(()),
            }
        });

        let response = match res {
            Ok(r) => r,
            Err(TransportError::Sink(source)) => {
                let e = storage_err.unwrap_or_else(|| CacheError::Write {
                    path: dest.to_path_buf(),
                    source,
                });
                tracing::warn!(url = %remote, path = %dest.display(), "cache write failed: {}", e);
                return FetchOutcome::StorageFailure(e);
            }
            Err(e) => {
                tracing::warn!(url = %remote, kind = ?e.kind(), "unable to fetch remote asset: {}", e);
                return FetchOutcome::TransportFailure(e);
            }
        };

        if response.status != 200 {
            tracing::warn!(url = %remote, status = response.status, "asset request did not return 200");
            return FetchOutcome::NotFound {
                status: response.status,
            };
        }

        // An empty 200 body never reaches the sink.
        let writer = match writer {
            Some(w) => w,
            None => match self.store.begin(dest) {
                Ok(w) => w,
                Err(e) => return FetchOutcome::StorageFailure(e),
            },
        };
        match writer.commit(response.remote_mtime.and_then(mtime_from_unix)) {
            Ok(bytes) => {
                tracing::info!(url = %remote, path = %dest.display(), bytes, "asset cached");
                FetchOutcome::Success { bytes }
            }
            Err(e) => {
                tracing::warn!(path = %dest.display(), "could not move asset into cache: {}", e);
                FetchOutcome::StorageFailure(e)
            }
        }
    }
}

/// Seconds since the Unix epoch to `SystemTime`; `None` for pre-epoch values.
pub(crate) fn mtime_from_unix(secs: i64) -> Option<SystemTime> {
    u64::try_from(secs)
        .ok()
        .map(|s| UNIX_EPOCH + Duration::from_secs(s))
}

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests;
