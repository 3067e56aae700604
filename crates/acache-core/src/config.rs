use crate::fetch::ClientOptions;
use crate::freshness::FreshnessStrategy;
use crate::source::{AssetSource, FALLBACK_ASSET_SOURCE, PRIMARY_ASSET_SOURCE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote base URLs (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub primary: String,
    pub fallback: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: PRIMARY_ASSET_SOURCE.to_string(),
            fallback: FALLBACK_ASSET_SOURCE.to_string(),
        }
    }
}

/// HTTP client limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole asset download.
    pub timeout_secs: u64,
    /// Seconds allowed for a freshness probe.
    pub probe_timeout_secs: u64,
    /// Overrides the default `acache/<version>` user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            timeout_secs: 60,
            probe_timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub fn client_options(&self) -> ClientOptions {
        let mut opts = ClientOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            probe_timeout: Duration::from_secs(self.probe_timeout_secs),
            ..ClientOptions::default()
        };
        if let Some(ua) = &self.user_agent {
            opts.user_agent = ua.clone();
        }
        opts
    }
}

/// How cached files are checked against the remote.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub strategy: FreshnessStrategy,
    /// Skip re-probing a file verified this many seconds ago (0 = always probe).
    pub recheck_interval_secs: u64,
}

impl FreshnessConfig {
    pub fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.recheck_interval_secs)
    }
}

/// Global configuration loaded from `~/.config/acache/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcacheConfig {
    /// Cache root; defaults to `$XDG_CACHE_HOME/acache/assets`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Optional read-only directory laid out like the cache (reported by `path`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_asset_dir: Option<PathBuf>,
    pub sources: SourcesConfig,
    pub http: HttpConfig,
    pub freshness: FreshnessConfig,
}

impl AcacheConfig {
    /// Effective cache root.
    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("acache")?;
        Ok(xdg_dirs.get_cache_home().join("acache").join("assets"))
    }

    /// Validated primary/fallback pair.
    pub fn asset_source(&self) -> Result<AssetSource> {
        AssetSource::parse(&self.sources.primary, &self.sources.fallback)
            .context("invalid [sources] in config")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("acache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AcacheConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as `load_or_init` for an explicit file.
pub fn load_or_init_at(path: &Path) -> Result<AcacheConfig> {
    if !path.exists() {
        let default_cfg = AcacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AcacheConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
