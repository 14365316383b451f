use clap::Parser;
use macro_snapshot::config::toml_config::SnapshotConfig;
use macro_snapshot::utils::{logger, validation::Validate};
use macro_snapshot::{CliConfig, LocalStorage, SnapshotEngine, SnapshotPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting macro-snapshot");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output.directory.clone());
    let pipeline = match SnapshotPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code().max(1));
        }
    };

    let engine = SnapshotEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Snapshot written to {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Snapshot run failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn print_plan(config: &SnapshotConfig) {
    println!("🔍 Dry run: {} metrics, nothing will be fetched", config.metric_count());
    for section in &config.sections {
        println!("[{}]", section.name);
        for metric in &section.metrics {
            println!("  {:<28} {}", metric.label, metric.source.describe());
        }
    }
    println!(
        "Output: {}",
        std::path::Path::new(&config.output.directory)
            .join(&config.output.file_name)
            .display()
    );
    if config.credentials.metalprice_api_key().is_none() {
        println!("Note: METALPRICE_API_KEY unset, metals use Yahoo Finance futures");
    }
}
