//! Closings watcher CLI
//!
//! Local execution entry point. For AWS Lambda, use `closings-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use closings::{
    error::{AppError, Result},
    models::{Config, SourceLayout},
    notify::ConsoleNotifier,
    pipeline::Runner,
    services::{AllowList, extract, reset_due},
    storage::{LocalStorage, StateStore},
    utils::HttpFetcher,
};

/// School closings watcher
#[derive(Parser, Debug)]
#[command(
    name = "closings",
    version,
    about = "School closings watcher with one alert per storm"
)]
struct Cli {
    /// Directory holding config.toml, the published snapshot and state
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch all sources, publish the snapshot and apply the storm rules
    Run,

    /// Extract entries from a saved page
    Extract {
        /// HTML file to read
        file: PathBuf,

        /// Page layout: status_table or heading_paragraph
        #[arg(long, value_parser = parse_layout)]
        layout: SourceLayout,

        /// Show entries outside the allow-list too
        #[arg(long)]
        all: bool,
    },

    /// Send a synthetic alert without touching state
    TestAlert,

    /// Show persisted storm state
    State,

    /// Validate configuration
    Validate,

    /// Print the default configuration as TOML
    Config,
}

fn parse_layout(s: &str) -> std::result::Result<SourceLayout, String> {
    match s {
        "status_table" => Ok(SourceLayout::StatusTable),
        "heading_paragraph" => Ok(SourceLayout::HeadingParagraph),
        other => Err(format!(
            "unknown layout '{other}' (expected status_table or heading_paragraph)"
        )),
    }
}

/// Initialize logging at the given default level.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let loaded = Config::load(&config_path);

    let level = if cli.verbose {
        "debug".to_string()
    } else {
        loaded
            .as_ref()
            .map(|c| c.logging.level.clone())
            .unwrap_or_else(|_| "info".to_string())
    };
    init_logging(&level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Config::default()
        }
    };

    let storage = LocalStorage::new(&cli.storage_dir, &config.publish.key);

    match cli.command {
        Command::Run => {
            let runner = build_runner(config, &storage)?;
            let outcome = runner.run().await;

            log::info!(
                "Snapshot {} with {} entries",
                outcome.payload.last_updated,
                outcome.payload.entries.len()
            );
            for entry in &outcome.payload.entries {
                log::info!("    [{}] {}: {}", entry.source, entry.name, entry.status);
            }
            if let Some(action) = outcome.action {
                log::info!(
                    "Storm action: {:?} (alert delivered: {})",
                    action,
                    outcome.alert_delivered
                );
            }
            if let Some(state) = outcome.state {
                log::debug!("Storm state after run: {state:?}");
            }
        }

        Command::Extract { file, layout, all } => {
            let html = std::fs::read_to_string(&file)?;
            let allow_list = AllowList::from_config(&config.allow_list);
            let pairs = extract(&html, layout);
            log::info!("Extracted {} entries from {}", pairs.len(), file.display());

            for pair in pairs {
                let in_scope = allow_list.is_in_scope(&pair.name);
                if all || in_scope {
                    let marker = if in_scope { "*" } else { " " };
                    println!("{marker} {}: {}", pair.name, pair.status);
                }
            }
        }

        Command::TestAlert => {
            let runner = build_runner(config, &storage)?;
            let payload = runner.send_test_alert().await;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }

        Command::State => {
            log::info!("Reading {}", storage.state_path().display());
            let state = storage.load().await?.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&state)?);

            if state.notified {
                let due = reset_due(
                    &state,
                    config.report.now(),
                    config.storm.reset_window(),
                );
                log::info!(
                    "Storm alerted; reset {}",
                    if due { "is due on the next quiet run" } else { "not yet due" }
                );
            } else {
                log::info!("No storm alert outstanding");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} sources, {} allow-list fragments)",
                config.sources.len(),
                AllowList::from_config(&config.allow_list).len()
            );
        }

        Command::Config => {
            print!("{}", toml::to_string_pretty(&Config::default())?);
        }
    }

    Ok(())
}

/// Runner backed by local files and a console notifier.
fn build_runner(config: Config, storage: &LocalStorage) -> Result<Runner> {
    if config.sources.is_empty() {
        return Err(AppError::config("No sources configured"));
    }
    let fetcher = HttpFetcher::from_config(&config.fetch)?;
    let storage = Arc::new(storage.clone());

    Ok(Runner::new(
        Arc::new(config),
        Arc::new(fetcher),
        storage.clone(),
        Arc::new(ConsoleNotifier),
        storage,
    ))
}
