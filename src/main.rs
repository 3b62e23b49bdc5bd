mod collectors;
mod config;
mod models;
mod util;
mod web;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use web::AppState;

#[derive(Parser, Debug)]
#[command(name = "diskinfo", about = "Mounted-filesystem usage dashboard over HTTP", version = "0.1")]
struct Cli {
    /// Filesystem types to ignore (repeatable, or comma-separated)
    #[arg(short = 'i', long = "ignore-type", env = "DISKINFO_IGNORE_TYPES", value_delimiter = ',')]
    ignore_type: Vec<String>,

    /// Prefix under which the host filesystem is mounted (e.g. /host in a container)
    #[arg(long, env = "DISKINFO_HOST_ROOT")]
    host_root: Option<PathBuf>,

    /// Listen address for the HTTP server
    #[arg(short = 'l', long, env = "DISKINFO_LISTEN")]
    listen: Option<String>,

    /// Print a one-shot JSON snapshot of all disk records and exit
    #[arg(long)]
    json: bool,

    /// Print config file path and effective values, then exit
    #[arg(long)]
    config: bool,
}

/// Flags and env beat the config file; the file beats built-in defaults.
struct Settings {
    listen:       String,
    ignore_types: HashSet<String>,
    host_root:    PathBuf,
}

impl Settings {
    fn merge(cli: &Cli, file: &Config) -> Self {
        let ignore_types = if cli.ignore_type.is_empty() {
            file.filter.ignore_types.iter().cloned().collect()
        } else {
            cli.ignore_type.iter().cloned().collect()
        };
        Self {
            listen: cli.listen.clone().unwrap_or_else(|| file.server.listen.clone()),
            ignore_types,
            host_root: cli
                .host_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(&file.filter.host_root)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::merge(&cli, &Config::load());

    if cli.json {
        return run_json_snapshot(&settings);
    }
    if cli.config {
        return run_print_config(&settings);
    }

    web::serve(
        &settings.listen,
        AppState {
            ignore_types: settings.ignore_types,
            host_root:    settings.host_root,
        },
    )
    .await
}

fn run_json_snapshot(settings: &Settings) -> Result<()> {
    use serde_json::json;

    let records = collectors::disks::collect_system(&settings.host_root, &settings.ignore_types);

    let snapshot = json!({
        "diskinfo_version": "0.1",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "disks": records,
    });

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn run_print_config(settings: &Settings) -> Result<()> {
    let path = Config::config_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "(unknown)".to_string());
    println!("Config: {}", path);
    println!();
    println!("[server]");
    println!("  listen = {}", settings.listen);
    println!();
    println!("[filter]");
    if settings.ignore_types.is_empty() {
        println!("  ignore_types = (none)");
    } else {
        let mut types: Vec<&str> = settings.ignore_types.iter().map(String::as_str).collect();
        types.sort_unstable();
        println!("  ignore_types = {:?}", types);
    }
    println!("  host_root = {}", settings.host_root.display());
    Ok(())
}
