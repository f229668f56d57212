//! # Catalog Pull Tool
//!
//! Pulls the customer and product files from the sync server.
//!
//! ## Usage
//! ```bash
//! # Both pulls, settings from fieldrep.toml
//! cargo run -p fieldrep-sync --bin pull
//!
//! # Only products, explicit database and server
//! cargo run -p fieldrep-sync --bin pull -- --db ./data/fieldrep.db \
//!     --base-url https://sync.example.com --products
//! ```
//!
//! Customers are only pulled when a rep code is known (`--rep`,
//! `[rep] code` or `FIELDREP_SALESREP`). An unreachable server is not an
//! error: the pull reports zero rows and leaves the tables as they were.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use fieldrep_db::{Database, DbConfig};
use fieldrep_sync::{HttpFetcher, PullSummary, SyncAgent, SyncConfig, SyncResult};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fieldrep=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("fieldrep catalog pull");
    println!();
    println!("Usage: pull [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>    Config file (default: platform config dir)");
    println!("  -d, --db <PATH>        Database file path");
    println!("  -r, --rep <CODE>       Sales rep code for the customer pull");
    println!("      --base-url <URL>   Sync server, overrides the settings row");
    println!("      --customers        Only pull customers");
    println!("      --products         Only pull products");
    println!("      --json             Print a JSON summary");
    println!("  -h, --help             Show this help message");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut db_path: Option<PathBuf> = None;
    let mut rep: Option<String> = None;
    let mut base_url: Option<String> = None;
    let mut customers = true;
    let mut products = true;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--rep" | "-r" => {
                if i + 1 < args.len() {
                    rep = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--base-url" => {
                if i + 1 < args.len() {
                    base_url = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--customers" => products = false,
            "--products" => customers = false,
            "--json" => json = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => return Err(format!("Unknown argument: {}", other).into()),
        }
        i += 1;
    }

    let mut config = SyncConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(code) = rep {
        config.rep.code = Some(code);
    }
    if base_url.is_some() {
        config.http.base_url = base_url;
    }
    config.validate()?;

    println!("fieldrep pull");
    println!("=============");
    println!("Database: {}", config.database.path.display());
    println!();

    let db = Database::new(DbConfig::new(&config.database.path)).await?;
    let agent = Arc::new(
        SyncAgent::new(db.clone(), HttpFetcher::new(&config.http))
            .with_base_url(config.http.base_url.clone()),
    );

    let mut pulls: Vec<(&str, JoinHandle<SyncResult<PullSummary>>)> = Vec::new();
    if customers {
        match config.salesrep() {
            Some(code) => {
                let agent = Arc::clone(&agent);
                let code = code.to_string();
                pulls.push((
                    "customers",
                    tokio::spawn(async move { agent.pull_customers(&code).await }),
                ));
            }
            None => eprintln!("- customers skipped: no rep code configured"),
        }
    }
    if products {
        let agent = Arc::clone(&agent);
        pulls.push(("products", tokio::spawn(async move { agent.pull_products().await })));
    }

    let mut failed = 0;
    let mut summary = serde_json::Map::new();
    for (name, handle) in pulls {
        match handle.await? {
            Ok(result) => {
                println!(
                    "✓ {}: {} records, {} inserted, {} updated",
                    name, result.records, result.inserted, result.updated
                );
                summary.insert(name.to_string(), serde_json::to_value(result)?);
            }
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}: {}", name, e);
                summary.insert(name.to_string(), serde_json::json!({ "error": e.to_string() }));
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    db.close().await;

    if failed > 0 {
        return Err(format!("{} pull(s) failed", failed).into());
    }
    Ok(())
}
