pub mod config;
pub mod core;
pub mod domain;
pub mod sources;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::SnapshotConfig;
pub use core::{etl::SnapshotEngine, pipeline::SnapshotPipeline};
pub use utils::error::{Result, SnapshotError};
