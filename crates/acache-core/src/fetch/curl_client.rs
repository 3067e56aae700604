//! libcurl-backed `HttpTransport`.
//!
//! One long-lived client is shared by every resolution. It keeps a small pool
//! of easy handles so connections (and TLS sessions) are reused between
//! requests; each request checks a handle out and an RAII guard returns it on
//! every exit path.

use super::parse::{parse_headers, parse_status_line};
use super::transport::{GetResponse, HeadResult, HttpTransport, TransportError};
use curl::easy::Easy;
use std::cell::Cell;
use std::io;
use std::ops::{Deref, DerefMut};
use std::str;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Idle easy handles kept for reuse.
const MAX_IDLE_HANDLES: usize = 8;

/// Timeouts and identity for outgoing requests.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Upper bound on establishing a connection.
    pub connect_timeout: Duration,
    /// Upper bound on a whole GET, body included.
    pub timeout: Duration,
    /// Upper bound on a whole HEAD / freshness probe.
    pub probe_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
            user_agent: format!("acache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Thread-safe HTTP client built on the curl crate.
pub struct CurlClient {
    options: ClientOptions,
    idle: Mutex<Vec<Easy>>,
}

impl CurlClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            idle: Mutex::new(Vec::new()),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn checkout(&self) -> PooledEasy<'_> {
        let easy = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(Easy::new);
        PooledEasy {
            easy: Some(easy),
            client: self,
        }
    }

    fn checkin(&self, mut easy: Easy) {
        // Clears options and callbacks; keeps the connection cache.
        easy.reset();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_HANDLES {
            idle.push(easy);
        }
    }

    fn configure(&self, easy: &mut Easy, url: &Url, timeout: Duration) -> Result<(), curl::Error> {
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.timeout(timeout)?;
        easy.useragent(&self.options.user_agent)?;
        // Parse Last-Modified so callers get it as a timestamp.
        easy.fetch_filetime(true)?;
        Ok(())
    }
}

impl Default for CurlClient {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl HttpTransport for CurlClient {
    fn head(&self, url: &Url) -> Result<HeadResult, TransportError> {
        let mut easy = self.checkout();
        self.configure(&mut easy, url, self.options.probe_timeout)?;
        easy.nobody(true)?;

        let mut headers: Vec<String> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.perform()?;
        }

        let mut result = parse_headers(&headers);
        result.status = easy.response_code()?;
        result.remote_mtime = easy.filetime()?;
        Ok(result)
    }

    fn get(
        &self,
        url: &Url,
        body: &mut dyn FnMut(u32, &[u8]) -> io::Result<()>,
    ) -> Result<GetResponse, TransportError> {
        let mut easy = self.checkout();
        self.configure(&mut easy, url, self.options.timeout)?;

        let status = Cell::new(0u32);
        let mut sink_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(|s| parse_status_line(s.trim())) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| match body(status.get(), data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    sink_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };
        if let Some(e) = sink_err {
            return Err(TransportError::Sink(e));
        }
        performed?;

        Ok(GetResponse {
            status: easy.response_code()?,
            remote_mtime: easy.filetime()?,
        })
    }
}

/// Easy handle on loan from a `CurlClient`; goes back to the pool on drop.
struct PooledEasy<'a> {
    easy: Option<Easy>,
    client: &'a CurlClient,
}

impl Deref for PooledEasy<'_> {
    type Target = Easy;

    fn deref(&self) -> &Easy {
        self.easy.as_ref().unwrap_or_else(|| unreachable!("easy handle taken before drop"))
    }
}

impl DerefMut for PooledEasy<'_> {
    fn deref_mut(&mut self) -> &mut Easy {
        self.easy.as_mut().unwrap_or_else(|| unreachable!("easy handle taken before drop"))
    }
}

impl Drop for PooledEasy<'_> {
    fn drop(&mut self) {
        if let Some(easy) = self.easy.take() {
            self.client.checkin(easy);
        }
    }
}
