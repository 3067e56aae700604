//! `acache path` – show local and remote locations of an asset.

use acache_core::config::AcacheConfig;
use acache_core::paths::PathResolver;
use acache_core::AssetCategory;
use anyhow::{Context, Result};

pub fn run_path(cfg: &AcacheConfig, category: AssetCategory, path: &str) -> Result<()> {
    let cache_root = cfg.cache_root()?;
    let paths = PathResolver::new(&cache_root)
        .with_context(|| format!("resolve cache root {}", cache_root.display()))?
        .with_global_root(cfg.global_asset_dir.clone());
    let sources = cfg.asset_source()?;

    let local = paths.local_path(category, path);
    println!("{:<9} {}", "local", local.display());
    if let Some(global) = paths.global_path(category, path) {
        println!("{:<9} {}", "global", global.display());
    }
    for (kind, base) in sources.iter() {
        println!("{:<9} {}", kind.to_string(), paths.remote_url(category, path, base));
    }
    Ok(())
}
