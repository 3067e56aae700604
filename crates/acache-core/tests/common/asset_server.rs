//! Minimal HTTP/1.1 asset server for integration tests.
//!
//! Serves a fixed set of paths with 200, `Content-Length` and `Last-Modified`;
//! everything else is 404. HEAD and GET requests are counted per server.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// `Last-Modified` sent for every asset.
pub const LAST_MODIFIED: &str = "Wed, 21 Oct 2015 07:28:00 GMT";
/// `LAST_MODIFIED` as Unix seconds.
pub const LAST_MODIFIED_UNIX: i64 = 1_445_412_480;

#[derive(Default)]
struct State {
    assets: Mutex<HashMap<String, Vec<u8>>>,
    heads: AtomicUsize,
    gets: AtomicUsize,
}

/// Handle to a running server. The server thread lives until the process exits.
#[derive(Clone)]
pub struct AssetServer {
    base: String,
    state: Arc<State>,
}

impl AssetServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State::default());
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Serve `body` at `path` (e.g. `/stickers/jetbrains/happy.png`).
    pub fn serve(&self, path: &str, body: &[u8]) -> &Self {
        self.state
            .assets
            .lock()
            .unwrap()
            .insert(path.to_string(), body.to_vec());
        self
    }

    pub fn heads(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }
}

/// A base URL nothing listens on.
pub fn closed_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_head(&mut stream) else {
        return;
    };
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    let head_only = method.eq_ignore_ascii_case("HEAD");
    if head_only {
        state.heads.fetch_add(1, Ordering::SeqCst);
    } else if method.eq_ignore_ascii_case("GET") {
        state.gets.fetch_add(1, Ordering::SeqCst);
    } else {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }

    let body = state.assets.lock().unwrap().get(path).cloned();
    match body {
        Some(body) => {
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nLast-Modified: {}\r\nConnection: close\r\n\r\n",
                body.len(),
                LAST_MODIFIED
            );
            let _ = stream.write_all(response.as_bytes());
            if !head_only {
                let _ = stream.write_all(&body);
            }
        }
        None => {
            let msg = b"not found";
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                msg.len()
            );
            let _ = stream.write_all(response.as_bytes());
            if !head_only {
                let _ = stream.write_all(msg);
            }
        }
    }
    let _ = stream.flush();
}

/// Reads up to the blank line ending the request head; returns the request line.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.len() > 64 * 1024 {
            return None;
        }
    }
    let text = String::from_utf8_lossy(&buf);
    text.lines().next().map(str::to_string)
}
