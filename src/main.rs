use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cloudscope::config::Config;
use cloudscope::error::format_fetch_error;
use cloudscope::{Provider, ResourceFetcher};
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Cached, retrying resource lookups across cloud providers
#[derive(Parser, Debug)]
#[command(name = "cloudscope", version, about, long_about = None)]
struct Args {
    /// Config file (JSON, or YAML by extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate credentials and initialize provider clients
    Check {
        /// Only check this provider
        #[arg(short, long, value_enum)]
        provider: Option<Provider>,
    },
    /// Print details for one or more resources
    Describe {
        #[arg(short, long, value_enum)]
        provider: Provider,

        #[arg(required = true)]
        resource_ids: Vec<String>,
    },
    /// Print whether a resource can be fetched
    Exists {
        #[arg(short, long, value_enum)]
        provider: Provider,

        resource_id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cloudscope started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cloudscope").join("cloudscope.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cloudscope").join("cloudscope.log");
    }
    PathBuf::from("cloudscope.log")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    let ok = match args.command {
        Command::Check { provider } => check(&config, provider).await,
        Command::Describe {
            provider,
            resource_ids,
        } => describe(&config, provider, &resource_ids).await?,
        Command::Exists {
            provider,
            resource_id,
        } => exists(&config, provider, &resource_id).await,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Initialize clients for `provider`'s credentials only
async fn connect(config: &Config, provider: Option<Provider>) -> Option<ResourceFetcher> {
    let mut fetcher = config.build_fetcher();
    match fetcher.initialize_clients(config.credentials_for(provider)).await {
        Ok(()) => Some(fetcher),
        Err(e) => {
            eprintln!("Initialization error: {}", format_fetch_error(&e));
            None
        }
    }
}

async fn check(config: &Config, provider: Option<Provider>) -> bool {
    let providers: Vec<Provider> = match provider {
        Some(p) => vec![p],
        None => {
            let mut configured: Vec<Provider> = config.credentials.keys().copied().collect();
            configured.sort();
            configured
        }
    };

    if providers.is_empty() {
        eprintln!("No providers configured");
        return false;
    }

    let mut all_ok = true;
    for p in providers {
        let mut fetcher = config.build_fetcher();
        match fetcher.initialize_clients(config.credentials_for(Some(p))).await {
            Ok(()) if fetcher.initialized_providers().contains(&p) => println!("{:<8} ok", p),
            Ok(()) => {
                println!("{:<8} no credentials configured", p);
                all_ok = false;
            }
            Err(e) => {
                println!("{:<8} {}", p, format_fetch_error(&e));
                all_ok = false;
            }
        }
    }
    all_ok
}

async fn describe(config: &Config, provider: Provider, resource_ids: &[String]) -> Result<bool> {
    let Some(fetcher) = connect(config, Some(provider)).await else {
        return Ok(false);
    };

    // Concurrent lookups of the same id would all miss the cache
    let resource_ids = unique_ids(resource_ids);
    let lookups = resource_ids
        .iter()
        .map(|id| fetcher.get_resource_details(provider, id));
    let results = futures::future::join_all(lookups).await;

    let mut all_ok = true;
    for (resource_id, result) in resource_ids.iter().zip(results) {
        match result {
            Ok(details) => {
                let report = json!({
                    "provider": provider,
                    "resource_id": resource_id,
                    "reported_at": chrono::Utc::now().to_rfc3339(),
                    "details": details,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(e) => {
                eprintln!("{}: {}", resource_id, format_fetch_error(&e));
                all_ok = false;
            }
        }
    }
    Ok(all_ok)
}

async fn exists(config: &Config, provider: Provider, resource_id: &str) -> bool {
    let Some(fetcher) = connect(config, Some(provider)).await else {
        return false;
    };

    let found = fetcher.resource_exists(provider, resource_id).await;
    println!("{}", found);
    found
}

/// Drop repeated ids, keeping first-seen order
fn unique_ids(resource_ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    resource_ids
        .iter()
        .map(|id| id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}
