//! Pure mapping from an asset reference to its local cache path and its
//! remote URL on a given source.

mod normalize;

use crate::category::AssetCategory;
use normalize::contained_segments;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// `file://` URI of a cached asset. Never points at a remote location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUri(Url);

impl AssetUri {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Local filesystem path the URI refers to.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        self.0.to_file_path().ok()
    }
}

impl fmt::Display for AssetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Maps (category, relative path) to local and remote locations.
#[derive(Debug, Clone)]
pub struct PathResolver {
    cache_root: PathBuf,
    global_root: Option<PathBuf>,
}

impl PathResolver {
    /// `cache_root` is made absolute once here; every derived path is then
    /// absolute and depends only on its inputs.
    pub fn new(cache_root: &Path) -> std::io::Result<Self> {
        Ok(Self {
            cache_root: std::path::absolute(cache_root)?,
            global_root: None,
        })
    }

    /// Attach a read-only, host-provided directory laid out like the cache.
    pub fn with_global_root(mut self, global_root: Option<PathBuf>) -> Self {
        self.global_root = global_root;
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// True if `path` still names a file once normalized. Paths such as `""`,
    /// `".."` or `"a/.."` collapse onto the category directory itself and
    /// must not be cached or fetched.
    pub fn names_asset(&self, path: &str) -> bool {
        !contained_segments(path).is_empty()
    }

    /// `{cache_root}/{category}/{path}`, normalized so that it always stays
    /// inside the category directory.
    pub fn local_path(&self, category: AssetCategory, path: &str) -> PathBuf {
        under(&self.cache_root, category, path)
    }

    /// Same layout under the global asset directory, if one is configured.
    pub fn global_path(&self, category: AssetCategory, path: &str) -> Option<PathBuf> {
        self.global_root
            .as_deref()
            .map(|root| under(root, category, path))
    }

    /// `{base}/{category}/{platform?}/{path}` with percent-encoded segments.
    pub fn remote_url(&self, category: AssetCategory, path: &str, base: &Url) -> Url {
        let mut url = base.clone();
        // Sources are validated as http(s) bases, so segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.push(category.dir_name());
            if let Some(platform) = category.platform_segment() {
                segments.push(platform);
            }
            segments.extend(contained_segments(path));
        }
        url
    }

    /// `file://` URI for an absolute local path.
    pub fn file_uri(&self, local: &Path) -> Option<AssetUri> {
        Url::from_file_path(local).ok().map(AssetUri)
    }
}

fn under(root: &Path, category: AssetCategory, path: &str) -> PathBuf {
    let mut out = root.join(category.dir_name());
    out.extend(contained_segments(path));
    out
}
