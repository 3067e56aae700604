//! `acache config` – show config location and effective values.

use acache_core::config::{self, AcacheConfig};
use acache_core::logging;
use anyhow::Result;

pub fn run_config(cfg: &AcacheConfig) -> Result<()> {
    println!("config: {}", config::config_path()?.display());
    println!("cache:  {}", cfg.cache_root()?.display());
    if let Ok(log) = logging::log_path() {
        println!("log:    {}", log.display());
    }
    println!("{}", serde_json::to_string_pretty(cfg)?);
    Ok(())
}
