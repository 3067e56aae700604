//! HEAD-based probe: compares remote size and Last-Modified with the cached
//! file's size and modification time. The fetcher stamps the file's mtime
//! from the same header, so no sidecar metadata is needed.

use super::{Freshness, FreshnessProbe, ProbeError};
use crate::fetch::HttpTransport;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use url::Url;

pub struct HeadProbe {
    transport: Arc<dyn HttpTransport>,
}

impl HeadProbe {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

impl FreshnessProbe for HeadProbe {
    fn probe(&self, local: &Path, remote: &Url) -> Result<Freshness, ProbeError> {
        let head = self.transport.head(remote)?;
        if !(200..300).contains(&head.status) {
            return Err(ProbeError::Status(head.status));
        }

        let meta = std::fs::metadata(local)?;
        let mut compared = false;

        if let Some(remote_len) = head.content_length {
            compared = true;
            if remote_len != meta.len() {
                tracing::debug!(url = %remote, remote_len, local_len = meta.len(), "size differs");
                return Ok(Freshness::Changed);
            }
        }

        if let Some(remote_mtime) = head.remote_mtime {
            compared = true;
            let local_mtime = meta
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(-1);
            if local_mtime != remote_mtime {
                tracing::debug!(url = %remote, remote_mtime, local_mtime, "modification time differs");
                return Ok(Freshness::Changed);
            }
        }

        if compared {
            Ok(Freshness::Fresh)
        } else {
            Err(ProbeError::NoSignal)
        }
    }
}
