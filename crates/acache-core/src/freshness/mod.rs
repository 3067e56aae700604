//! Decides whether a cached asset must be fetched again.
//!
//! A missing file is always stale. Otherwise a pluggable `FreshnessProbe`
//! compares a cheap remote signal with the local copy. Probe failures count as
//! stale: a flaky network must never pin a broken cache entry as fresh.

mod checksum;
mod head;

pub use checksum::{ChecksumProbe, CHECKSUM_SUFFIX};
pub use head::HeadProbe;

use crate::fetch::TransportError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Verdict of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Changed,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe request failed")]
    Transport(#[from] TransportError),
    #[error("probe returned HTTP {0}")]
    Status(u32),
    #[error("cannot inspect cached file")]
    Local(#[from] std::io::Error),
    #[error(transparent)]
    Digest(#[from] anyhow::Error),
    #[error("remote offered nothing to compare against")]
    NoSignal,
    #[error("checksum sidecar {0:?} is not a SHA-256 digest")]
    UnsupportedDigest(String),
}

/// Strategy for comparing a cached file with its remote counterpart.
/// Must not download the asset itself.
pub trait FreshnessProbe: Send + Sync {
    fn probe(&self, local: &Path, remote: &Url) -> Result<Freshness, ProbeError>;
}

/// Which built-in probe to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStrategy {
    /// HEAD request; compare size and Last-Modified with file metadata.
    #[default]
    Head,
    /// Fetch `{url}.checksum.txt`; compare with the file's SHA-256.
    Checksum,
}

/// Wraps a probe with the missing-file rule, fail-open handling and an
/// optional in-memory recheck interval.
pub struct FreshnessChecker {
    probe: Box<dyn FreshnessProbe>,
    recheck_interval: Duration,
    verified: Mutex<HashMap<PathBuf, Instant>>,
}

impl FreshnessChecker {
    pub fn new(probe: Box<dyn FreshnessProbe>) -> Self {
        Self {
            probe,
            recheck_interval: Duration::ZERO,
            verified: Mutex::new(HashMap::new()),
        }
    }

    /// Skip probing a path that was verified within `interval`. Zero disables.
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    /// True if `local` must be (re)downloaded from `remote`.
    pub fn is_stale(&self, local: &Path, remote: &Url) -> bool {
        if !local.is_file() {
            tracing::debug!(path = %local.display(), "not cached yet");
            return true;
        }
        if self.recently_verified(local) {
            tracing::debug!(path = %local.display(), "verified within recheck interval");
            return false;
        }
        match self.probe.probe(local, remote) {
            Ok(Freshness::Fresh) => {
                tracing::debug!(url = %remote, "cached asset is fresh");
                self.mark_verified(local);
                false
            }
            Ok(Freshness::Changed) => {
                tracing::debug!(url = %remote, "remote asset changed");
                true
            }
            Err(e) => {
                tracing::warn!(url = %remote, "freshness probe failed, treating as stale: {:#}", anyhow::Error::new(e));
                true
            }
        }
    }

    /// Record that `local` matches the remote as of now.
    pub fn mark_verified(&self, local: &Path) {
        if self.recheck_interval.is_zero() {
            return;
        }
        self.verified
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(local.to_path_buf(), Instant::now());
    }

    fn recently_verified(&self, local: &Path) -> bool {
        if self.recheck_interval.is_zero() {
            return false;
        }
        self.verified
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(local)
            .is_some_and(|at| at.elapsed() < self.recheck_interval)
    }
}
