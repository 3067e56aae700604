//! Asset resolution: (category, path) -> cached local file URI.
//!
//! Sources are tried strictly in order, primary then fallback. For each source
//! the cached copy is either still fresh (served without downloading) or is
//! downloaded again; the first source that yields a usable file wins. All
//! failures are logged and collapse into `Resolution::Unavailable`.

mod single_flight;

pub use single_flight::{FlightStats, SingleFlight};

use crate::category::AssetCategory;
use crate::config::AcacheConfig;
use crate::fetch::{CurlClient, FetchOutcome, HttpTransport, RemoteFetcher};
use crate::freshness::{ChecksumProbe, FreshnessChecker, FreshnessProbe, FreshnessStrategy, HeadProbe};
use crate::paths::{AssetUri, PathResolver};
use crate::source::AssetSource;
use crate::storage::CacheStore;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Outcome visible to callers. Failure details only go to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The asset is cached locally at this `file://` URI.
    Resolved(AssetUri),
    /// No source produced a usable file.
    Unavailable,
}

impl Resolution {
    pub fn uri(&self) -> Option<&AssetUri> {
        match self {
            Resolution::Resolved(uri) => Some(uri),
            Resolution::Unavailable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Serve a fresh cached copy when there is one.
    Cached,
    /// Always download.
    Forced,
}

/// Per-source result shared between single-flight waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceVerdict {
    Usable,
    Unusable,
    /// The cache itself is unwritable; no other source can help.
    StorageFailed,
}

/// Resolves assets against the local cache and the remote sources.
///
/// Blocking; call from worker threads. Shareable across threads behind `Arc`.
pub struct AssetResolver {
    paths: PathResolver,
    sources: AssetSource,
    store: CacheStore,
    fetcher: RemoteFetcher,
    checker: FreshnessChecker,
    in_flight: SingleFlight<(PathBuf, Url), SourceVerdict>,
}

impl AssetResolver {
    /// Build from parts. `transport` is the one shared HTTP client; the
    /// checker's probe normally holds a clone of the same `Arc`.
    pub fn new(
        paths: PathResolver,
        sources: AssetSource,
        transport: Arc<dyn HttpTransport>,
        checker: FreshnessChecker,
    ) -> Self {
        let store = CacheStore::new();
        Self {
            paths,
            sources,
            store,
            fetcher: RemoteFetcher::new(transport, store),
            checker,
            in_flight: SingleFlight::new(),
        }
    }

    /// Build the production resolver: libcurl client, configured probe,
    /// cache root and sources from `cfg`.
    pub fn from_config(cfg: &AcacheConfig) -> Result<Self> {
        let cache_root = cfg.cache_root()?;
        let paths = PathResolver::new(&cache_root)
            .with_context(|| format!("resolve cache root {}", cache_root.display()))?
            .with_global_root(cfg.global_asset_dir.clone());
        let sources = cfg.asset_source()?;
        let transport: Arc<dyn HttpTransport> = Arc::new(CurlClient::new(cfg.http.client_options()));
        let probe: Box<dyn FreshnessProbe> = match cfg.freshness.strategy {
            FreshnessStrategy::Head => Box::new(HeadProbe::new(Arc::clone(&transport))),
            FreshnessStrategy::Checksum => Box::new(ChecksumProbe::new(Arc::clone(&transport))),
        };
        let checker = FreshnessChecker::new(probe).with_recheck_interval(cfg.freshness.recheck_interval());
        tracing::debug!(
            cache_root = %paths.cache_root().display(),
            primary = %sources.primary(),
            fallback = %sources.fallback(),
            strategy = ?cfg.freshness.strategy,
            "asset resolver ready"
        );
        Ok(Self::new(paths, sources, transport, checker))
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn sources(&self) -> &AssetSource {
        &self.sources
    }

    pub fn flight_stats(&self) -> &FlightStats {
        self.in_flight.stats()
    }

    /// Resolve to a cached file, downloading only when missing or stale.
    pub fn resolve(&self, category: AssetCategory, path: &str) -> Resolution {
        self.run(category, path, Mode::Cached)
    }

    /// Resolve to a freshly downloaded file, ignoring any cached copy.
    pub fn force_resolve(&self, category: AssetCategory, path: &str) -> Resolution {
        self.run(category, path, Mode::Forced)
    }

    /// True if the cached copy is missing or stale against the primary source.
    pub fn check(&self, category: AssetCategory, path: &str) -> bool {
        if !self.paths.names_asset(path) {
            tracing::warn!(%category, path, "asset path is empty after normalization");
            return true;
        }
        let local = self.paths.local_path(category, path);
        let remote = self.paths.remote_url(category, path, self.sources.primary());
        self.checker.is_stale(&local, &remote)
    }

    fn run(&self, category: AssetCategory, path: &str, mode: Mode) -> Resolution {
        let _span = tracing::debug_span!("resolve", %category, path, ?mode).entered();
        if !self.paths.names_asset(path) {
            tracing::warn!(%category, path, "asset path is empty after normalization");
            return Resolution::Unavailable;
        }
        let local = self.paths.local_path(category, path);

        for (source, base) in self.sources.iter() {
            let remote = self.paths.remote_url(category, path, base);
            match self.try_source(&local, &remote, mode) {
                SourceVerdict::Usable => return self.resolved(&local),
                SourceVerdict::Unusable => {
                    tracing::debug!(%source, url = %remote, "source yielded no usable asset");
                }
                SourceVerdict::StorageFailed => {
                    tracing::warn!(path = %local.display(), "cache not writable, giving up");
                    return Resolution::Unavailable;
                }
            }
        }

        tracing::warn!(%category, path, "asset unavailable from every source");
        Resolution::Unavailable
    }

    fn try_source(&self, local: &Path, remote: &Url, mode: Mode) -> SourceVerdict {
        if mode == Mode::Cached && !self.checker.is_stale(local, remote) {
            return if self.store.exists(local) {
                tracing::debug!(path = %local.display(), "serving cached asset");
                SourceVerdict::Usable
            } else {
                SourceVerdict::Unusable
            };
        }
        self.in_flight
            .run((local.to_path_buf(), remote.clone()), || self.download(local, remote))
    }

    fn download(&self, local: &Path, remote: &Url) -> SourceVerdict {
        match self.fetcher.download(remote, local) {
            FetchOutcome::Success { .. } => {
                self.checker.mark_verified(local);
                SourceVerdict::Usable
            }
            FetchOutcome::NotFound { .. } | FetchOutcome::TransportFailure(_) => SourceVerdict::Unusable,
            FetchOutcome::StorageFailure(_) => SourceVerdict::StorageFailed,
        }
    }

    fn resolved(&self, local: &Path) -> Resolution {
        match self.paths.file_uri(local) {
            Some(uri) => Resolution::Resolved(uri),
            None => {
                tracing::warn!(path = %local.display(), "cached path cannot be expressed as a file URI");
                Resolution::Unavailable
            }
        }
    }
}
