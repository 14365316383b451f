#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::SnapshotConfig;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "macro-snapshot")]
#[command(about = "Fetch macro and market indicators into a single JSON snapshot")]
pub struct CliConfig {
    /// Path to a TOML configuration file; the built-in layout is used when omitted
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the snapshot is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// File name of the snapshot
    #[arg(long)]
    pub file_name: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr, for scheduled runs whose logs go to a collector
    #[arg(long)]
    pub log_json: bool,

    /// Show which metrics would be fetched without calling any provider
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the config file (or defaults), applies command-line overrides and
    /// resolves API keys from the environment.
    pub fn load_config(&self) -> Result<SnapshotConfig> {
        let mut config = match &self.config {
            Some(path) => SnapshotConfig::from_file(path)?,
            None => SnapshotConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(name) = &self.file_name {
            config.output.file_name = name.clone();
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_seconds = timeout;
        }

        config.credentials.resolve_with(|var| std::env::var(var).ok());
        Ok(config)
    }
}
