//! Checksum probe: the remote publishes `{asset}.checksum.txt` next to every
//! asset; its first token is compared with the SHA-256 of the cached file.
//!
//! Only SHA-256 sidecars (64 hex digits, as written by `acache checksum`) are
//! understood. Any other digest is a probe error, which counts as stale.

use super::{Freshness, FreshnessProbe, ProbeError};
use crate::checksum::sha256_path;
use crate::fetch::HttpTransport;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Suffix appended to the asset URL to locate its checksum sidecar.
pub const CHECKSUM_SUFFIX: &str = ".checksum.txt";

/// Sidecars are a single digest; anything bigger is not one.
const MAX_SIDECAR_BYTES: usize = 1024;

/// Hex length of a SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

pub struct ChecksumProbe {
    transport: Arc<dyn HttpTransport>,
}

impl ChecksumProbe {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

/// `https://host/a/b.png` -> `https://host/a/b.png.checksum.txt`.
pub(crate) fn sidecar_url(remote: &Url) -> Url {
    let mut url = remote.clone();
    let path = format!("{}{}", remote.path(), CHECKSUM_SUFFIX);
    url.set_path(&path);
    url
}

impl FreshnessProbe for ChecksumProbe {
    fn probe(&self, local: &Path, remote: &Url) -> Result<Freshness, ProbeError> {
        let (response, body) = self
            .transport
            .get_small(&sidecar_url(remote), MAX_SIDECAR_BYTES)?;
        if response.status != 200 {
            return Err(ProbeError::Status(response.status));
        }
        let text = String::from_utf8_lossy(&body);
        let remote_digest = text
            .split_whitespace()
            .next()
            .ok_or(ProbeError::NoSignal)?
            .to_ascii_lowercase();
        if remote_digest.len() != SHA256_HEX_LEN
            || !remote_digest.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(ProbeError::UnsupportedDigest(remote_digest));
        }

        let local_digest = sha256_path(local)?;
        if local_digest == remote_digest {
            Ok(Freshness::Fresh)
        } else {
            Ok(Freshness::Changed)
        }
    }
}
