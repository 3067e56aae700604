pub mod config;
pub mod logging;

pub mod category;
pub mod checksum;
pub mod fetch;
pub mod freshness;
pub mod paths;
pub mod resolver;
pub mod source;
pub mod storage;

pub use category::AssetCategory;
pub use paths::AssetUri;
pub use resolver::{AssetResolver, Resolution};
