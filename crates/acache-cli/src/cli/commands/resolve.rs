//! `acache resolve` – resolve one asset to a local file URI.

use crate::cli::EXIT_UNAVAILABLE;
use acache_core::config::AcacheConfig;
use acache_core::{AssetCategory, AssetResolver, Resolution};
use anyhow::Result;
use std::process::ExitCode;
use std::sync::Arc;

pub async fn run_resolve(
    cfg: &AcacheConfig,
    category: AssetCategory,
    path: String,
    force: bool,
    json: bool,
) -> Result<ExitCode> {
    let resolver = Arc::new(AssetResolver::from_config(cfg)?);
    let res = resolve_blocking(resolver, category, path.clone(), force).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&to_json(category, &path, &res))?);
    } else {
        match &res {
            Resolution::Resolved(uri) => println!("{}", uri),
            Resolution::Unavailable => eprintln!("{}/{}: unavailable", category, path),
        }
    }

    Ok(exit_code(&res))
}

/// Run one resolution on tokio's blocking pool.
pub(super) async fn resolve_blocking(
    resolver: Arc<AssetResolver>,
    category: AssetCategory,
    path: String,
    force: bool,
) -> Result<Resolution> {
    let res = tokio::task::spawn_blocking(move || {
        if force {
            resolver.force_resolve(category, &path)
        } else {
            resolver.resolve(category, &path)
        }
    })
    .await?;
    Ok(res)
}

pub(super) fn to_json(category: AssetCategory, path: &str, res: &Resolution) -> serde_json::Value {
    serde_json::json!({
        "category": category,
        "path": path,
        "resolved": res.is_resolved(),
        "uri": res.uri().map(|u| u.as_str()),
    })
}

pub(super) fn exit_code(res: &Resolution) -> ExitCode {
    if res.is_resolved() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNAVAILABLE)
    }
}
