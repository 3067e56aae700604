//! `acache check` – freshness of one cached asset against the primary source.

use acache_core::config::AcacheConfig;
use acache_core::{AssetCategory, AssetResolver};
use anyhow::Result;

pub async fn run_check(cfg: &AcacheConfig, category: AssetCategory, path: String) -> Result<()> {
    let resolver = AssetResolver::from_config(cfg)?;
    let stale = tokio::task::spawn_blocking(move || resolver.check(category, &path)).await?;
    println!("{}", if stale { "stale" } else { "fresh" });
    Ok(())
}
