pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{InMemoryCatalog, StashClient};
pub use config::{PluginInput, Settings};
pub use crate::core::{resolver::OrphanResolver, stats::RunStats};
pub use utils::error::{LinkerError, Result};
