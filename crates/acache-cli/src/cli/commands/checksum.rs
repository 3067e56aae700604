//! `acache checksum` – SHA-256 of a file.

use acache_core::checksum;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Print the digest in `sha256sum` format.
pub async fn run_checksum(path: &Path) -> Result<()> {
    println!("{}  {}", digest_blocking(path.to_path_buf()).await?, path.display());
    Ok(())
}

/// Hash on tokio's blocking pool; files can be large.
async fn digest_blocking(path: PathBuf) -> Result<String> {
    tokio::task::spawn_blocking(move || checksum::sha256_path(&path)).await?
}
