//! Scripted in-memory transport for unit tests.

use super::transport::{GetResponse, HeadResult, HttpTransport, TransportError};
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use url::Url;

/// How the fake answers one URL.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    /// Complete response with the given status and body.
    Respond {
        status: u32,
        body: Vec<u8>,
        mtime: Option<i64>,
    },
    /// Curl error before any body byte (e.g. 7 = connection refused, 28 = timeout).
    Fail(i32),
    /// 200 headers, `prefix` of the body, then a stream error.
    Truncated(Vec<u8>),
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, Scripted>>,
    gets: Mutex<Vec<String>>,
    heads: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, s: Scripted) -> &Self {
        self.routes.lock().unwrap().insert(url.to_string(), s);
        self
    }

    pub(crate) fn ok(&self, url: &str, body: &[u8]) -> &Self {
        self.route(
            url,
            Scripted::Respond {
                status: 200,
                body: body.to_vec(),
                mtime: Some(1_445_412_480),
            },
        )
    }

    pub(crate) fn status(&self, url: &str, status: u32) -> &Self {
        self.route(
            url,
            Scripted::Respond {
                status,
                body: format!("status {}", status).into_bytes(),
                mtime: None,
            },
        )
    }

    pub(crate) fn fail(&self, url: &str, curl_code: i32) -> &Self {
        self.route(url, Scripted::Fail(curl_code))
    }

    /// URLs requested with GET, in order.
    pub(crate) fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    /// URLs requested with HEAD, in order.
    pub(crate) fn heads(&self) -> Vec<String> {
        self.heads.lock().unwrap().clone()
    }

    /// Total requests of any method.
    pub(crate) fn request_count(&self) -> usize {
        self.gets.lock().unwrap().len() + self.heads.lock().unwrap().len()
    }

    fn lookup(&self, url: &Url) -> Scripted {
        self.routes
            .lock()
            .unwrap()
            .get(url.as_str())
            .cloned()
            .unwrap_or(Scripted::Respond {
                status: 404,
                body: b"not found".to_vec(),
                mtime: None,
            })
    }
}

impl HttpTransport for FakeTransport {
    fn head(&self, url: &Url) -> Result<HeadResult, TransportError> {
        self.heads.lock().unwrap().push(url.to_string());
        match self.lookup(url) {
            Scripted::Respond { status, body, mtime } => Ok(HeadResult {
                status,
                content_length: Some(body.len() as u64),
                remote_mtime: mtime,
            }),
            Scripted::Fail(code) => Err(TransportError::Curl(curl::Error::new(code as _))),
            Scripted::Truncated(_) => Err(TransportError::Curl(curl::Error::new(18))),
        }
    }

    fn get(
        &self,
        url: &Url,
        body: &mut dyn FnMut(u32, &[u8]) -> io::Result<()>,
    ) -> Result<GetResponse, TransportError> {
        self.gets.lock().unwrap().push(url.to_string());
        match self.lookup(url) {
            Scripted::Respond {
                status,
                body: bytes,
                mtime,
            } => {
                for chunk in bytes.chunks(3) {
                    body(status, chunk).map_err(TransportError::Sink)?;
                }
                Ok(GetResponse {
                    status,
                    remote_mtime: mtime,
                })
            }
            Scripted::Fail(code) => Err(TransportError::Curl(curl::Error::new(code as _))),
            Scripted::Truncated(prefix) => {
                for chunk in prefix.chunks(3) {
                    body(200, chunk).map_err(TransportError::Sink)?;
                }
                Err(TransportError::Curl(curl::Error::new(18)))
            }
        }
    }
}
