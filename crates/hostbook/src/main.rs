//! hostbook
//!
//! Normalizes inventory and fact data into a host registry and emits it as
//! JSON for a downstream reporting layer

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostbook_core::{HostPatch, HostRegistry, InventoryLoader};
use hostbook_facts::FactLoader;
use hostbook_resolver::{AnsibleCliResolver, LocalRunner};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "hostbook")]
#[command(about = "Normalize inventory and facts into a host registry", long_about = None)]
struct Cli {
    /// Inventory source file or directory (repeatable)
    #[arg(short = 'i', long = "inventory")]
    inventory: Vec<PathBuf>,

    /// Limit expression handed to the inventory engine
    #[arg(short = 'l', long)]
    limit: Option<String>,

    /// Directory containing setup-module fact files (repeatable)
    #[arg(short = 'f', long = "fact-dir")]
    fact_dirs: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // CLI flags override configured values
    if !cli.inventory.is_empty() {
        config.inventory = cli.inventory;
    }
    if cli.limit.is_some() {
        config.limit = cli.limit;
    }
    if !cli.fact_dirs.is_empty() {
        config.fact_dirs = cli.fact_dirs;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if config.inventory.is_empty() {
        eyre::bail!("no inventory sources configured (use -i or a config file)");
    }

    let mut registry = HostRegistry::new();

    if !config.fact_dirs.is_empty() {
        let facts = FactLoader::new(config.fact_dirs.clone()).load()?;
        info!(hosts = facts.len(), "seeding registry from fact files");
        for (hostname, host_facts) in facts {
            registry.update(
                &hostname,
                HostPatch::new()
                    .with_name(hostname.as_str())
                    .with_facts(host_facts),
            );
        }
    }

    let runner = Arc::new(LocalRunner::new());
    let resolver = Arc::new(
        AnsibleCliResolver::new(runner, config.inventory.clone())
            .with_timeout(Duration::from_secs(config.resolve_timeout_secs)),
    );

    let mut loader = InventoryLoader::new(resolver);
    if let Some(limit) = &config.limit {
        loader = loader.with_limit(limit.clone());
    }
    loader.load(&mut registry).await?;

    info!(hosts = registry.len(), "registry loaded");

    // Feed for the downstream reporting layer
    serde_json::to_writer_pretty(std::io::stdout().lock(), registry.get_hosts())?;
    println!();

    Ok(())
}
