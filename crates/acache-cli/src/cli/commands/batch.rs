//! `acache batch` – resolve many assets with bounded concurrency.

use super::resolve::{exit_code, resolve_blocking};
use acache_core::config::AcacheConfig;
use acache_core::{AssetCategory, AssetResolver, Resolution};
use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Resolve `paths`, at most `jobs` at a time. Prints one line per asset in
/// completion order; exits with the unavailable code if any asset failed.
pub async fn run_batch(
    cfg: &AcacheConfig,
    category: AssetCategory,
    paths: Vec<String>,
    jobs: usize,
    force: bool,
) -> Result<ExitCode> {
    let resolver = Arc::new(AssetResolver::from_config(cfg)?);
    let jobs = jobs.max(1);
    let total = paths.len();
    let mut set: JoinSet<Result<(String, Resolution)>> = JoinSet::new();
    let mut unavailable = 0usize;

    for path in paths {
        while set.len() >= jobs {
            if let Some(done) = set.join_next().await {
                unavailable += report(done??);
            }
        }
        let resolver = Arc::clone(&resolver);
        set.spawn(async move {
            let res = resolve_blocking(resolver, category, path.clone(), force).await?;
            Ok((path, res))
        });
    }
    while let Some(done) = set.join_next().await {
        unavailable += report(done??);
    }

    let stats = resolver.flight_stats();
    tracing::info!(
        total,
        unavailable,
        downloads = stats.leaders.load(std::sync::atomic::Ordering::Relaxed),
        shared = stats.waiters.load(std::sync::atomic::Ordering::Relaxed),
        "batch finished"
    );
    if unavailable > 0 {
        eprintln!("{} of {} assets unavailable", unavailable, total);
        return Ok(exit_code(&Resolution::Unavailable));
    }
    Ok(ExitCode::SUCCESS)
}

/// Print one result; returns 1 if it was unavailable.
fn report((path, res): (String, Resolution)) -> usize {
    match res {
        Resolution::Resolved(uri) => {
            println!("{}\t{}", path, uri);
            0
        }
        Resolution::Unavailable => {
            println!("{}\tunavailable", path);
            1
        }
    }
}
