//! Fixed set of asset categories and their on-disk / remote directory names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path segment inserted after the category directory in remote sticker URLs.
pub const STICKER_PLATFORM_SEGMENT: &str = "jetbrains";

/// Kind of asset. Each category owns one sub-directory, both in the local
/// cache and on every remote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Stickers,
    Backgrounds,
    Promotion,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::Stickers,
        AssetCategory::Backgrounds,
        AssetCategory::Promotion,
    ];

    /// Directory name used locally and remotely.
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetCategory::Stickers => "stickers",
            AssetCategory::Backgrounds => "backgrounds",
            AssetCategory::Promotion => "promotion",
        }
    }

    /// Extra remote path segment between the category directory and the asset path.
    pub fn platform_segment(self) -> Option<&'static str> {
        match self {
            AssetCategory::Stickers => Some(STICKER_PLATFORM_SEGMENT),
            AssetCategory::Backgrounds | AssetCategory::Promotion => None,
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset category {0:?} (expected stickers, backgrounds or promotion)")]
pub struct UnknownCategory(pub String);

impl FromStr for AssetCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stickers" | "sticker" => Ok(AssetCategory::Stickers),
            "backgrounds" | "background" => Ok(AssetCategory::Backgrounds),
            "promotion" | "promotions" => Ok(AssetCategory::Promotion),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}
