//! Remote asset sources: a fixed primary and fallback base URL.

use thiserror::Error;
use url::Url;

/// Default primary asset host.
pub const PRIMARY_ASSET_SOURCE: &str = "https://doki.assets.unthrottled.io";
/// Default fallback asset host, used only when the primary yields nothing usable.
pub const FALLBACK_ASSET_SOURCE: &str =
    "https://raw.githubusercontent.com/doki-theme/doki-theme-assets/master";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid {which} source URL {value:?}")]
    Parse {
        which: SourceKind,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{which} source URL {value:?} must be http or https with a path")]
    Unsupported { which: SourceKind, value: String },
}

/// Which of the two sources a base URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Primary,
    Fallback,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Primary => f.write_str("primary"),
            SourceKind::Fallback => f.write_str("fallback"),
        }
    }
}

/// Ordered pair of source base URLs. Primary is always tried first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
    primary: Url,
    fallback: Url,
}

impl AssetSource {
    /// Parse and validate both base URLs. Validation happens once here so that
    /// building per-asset URLs later cannot fail.
    pub fn parse(primary: &str, fallback: &str) -> Result<Self, SourceError> {
        Ok(Self {
            primary: parse_base(SourceKind::Primary, primary)?,
            fallback: parse_base(SourceKind::Fallback, fallback)?,
        })
    }

    pub fn primary(&self) -> &Url {
        &self.primary
    }

    pub fn fallback(&self) -> &Url {
        &self.fallback
    }

    /// Sources in attempt order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceKind, &Url)> {
        [
            (SourceKind::Primary, &self.primary),
            (SourceKind::Fallback, &self.fallback),
        ]
        .into_iter()
    }
}

fn parse_base(which: SourceKind, value: &str) -> Result<Url, SourceError> {
    let url = Url::parse(value.trim()).map_err(|source| SourceError::Parse {
        which,
        value: value.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(SourceError::Unsupported {
            which,
            value: value.to_string(),
        });
    }
    Ok(url)
}
