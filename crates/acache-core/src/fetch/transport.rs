//! HTTP transport seam. The fetcher and freshness probes only see this trait;
//! the libcurl client is one implementation, test fakes are another.

use std::io;
use thiserror::Error;
use url::Url;

/// Metadata returned by a HEAD request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Final HTTP status (after redirects).
    pub status: u32,
    /// `Content-Length`, if present.
    pub content_length: Option<u64>,
    /// `Last-Modified` as seconds since the Unix epoch, if the client parsed it.
    pub remote_mtime: Option<i64>,
}

/// Summary of a completed GET; the body went to the caller's sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetResponse {
    /// Final HTTP status (after redirects).
    pub status: u32,
    /// `Last-Modified` as seconds since the Unix epoch, if available.
    pub remote_mtime: Option<i64>,
}

/// Coarse transport failure class, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connect or total operation timed out.
    Timeout,
    /// DNS, refused, reset, or broken stream.
    Connection,
    /// Anything else.
    Other,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// libcurl reported an error.
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// The body sink refused a chunk; the transfer was aborted.
    #[error("response body sink failed: {0}")]
    Sink(#[source] io::Error),
    /// Response was larger than the caller allowed.
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

impl TransportError {
    /// Classify for logging (mirrors how retryable curl errors are grouped).
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Curl(e) => classify_curl_error(e),
            TransportError::Sink(_) | TransportError::TooLarge { .. } => TransportErrorKind::Other,
        }
    }
}

/// Classify a curl error into a transport failure kind.
pub fn classify_curl_error(e: &curl::Error) -> TransportErrorKind {
    if e.is_operation_timedout() {
        return TransportErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return TransportErrorKind::Connection;
    }
    TransportErrorKind::Other
}

/// Blocking HTTP operations used by the cache. Implementations must be
/// shareable across worker threads.
pub trait HttpTransport: Send + Sync {
    /// HEAD `url`. Any completed exchange is `Ok`, whatever its status.
    fn head(&self, url: &Url) -> Result<HeadResult, TransportError>;

    /// GET `url`, handing each body chunk to `body` along with the final
    /// response status. Returning `Err` from `body` aborts the transfer with
    /// `TransportError::Sink`.
    fn get(
        &self,
        url: &Url,
        body: &mut dyn FnMut(u32, &[u8]) -> io::Result<()>,
    ) -> Result<GetResponse, TransportError>;

    /// GET `url` into memory, refusing bodies larger than `limit`.
    fn get_small(&self, url: &Url, limit: usize) -> Result<(GetResponse, Vec<u8>), TransportError> {
        let mut buf = Vec::new();
        let mut too_large = false;
        let res = self.get(url, &mut |_status, chunk| {
            if buf.len() + chunk.len() > limit {
                too_large = true;
                return Err(io::Error::new(io::ErrorKind::Other, "body too large"));
            }
            buf.extend_from_slice(chunk);
            Ok(())
        });
        match res {
            Ok(r) => Ok((r, buf)),
            Err(_) if too_large => Err(TransportError::TooLarge { limit }),
            Err(e) => Err(e),
        }
    }
}
