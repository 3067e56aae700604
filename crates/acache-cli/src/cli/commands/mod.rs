//! CLI command handlers, one file per command.

mod batch;
mod check;
mod checksum;
mod config;
mod generate;
mod path;
mod resolve;

pub use batch::run_batch;
pub use check::run_check;
pub use checksum::run_checksum;
pub use config::run_config;
pub use generate::{run_completions, run_man};
pub use path::run_path;
pub use resolve::run_resolve;
