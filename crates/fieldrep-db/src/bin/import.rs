//! # Bulk Import Tool
//!
//! Replaces one table with the contents of a delimited export file.
//!
//! ## Usage
//! ```bash
//! # Import pipe-delimited contacts
//! cargo run -p fieldrep-db --bin import -- --kind contacts --file contacts.txt
//!
//! # Customers come comma-delimited with a header row
//! cargo run -p fieldrep-db --bin import -- --kind customers --file kunder.csv --header
//!
//! # Several files at once, one worker per kind
//! cargo run -p fieldrep-db --bin import -- --db ./data/fieldrep.db \
//!     --kind visits --file visits.txt --kind lines --file lines.txt
//! ```
//!
//! The target table is dropped and recreated before its rows are inserted.
//! A record with the wrong number of columns stops that file's import;
//! rows inserted before it are kept.

use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use fieldrep_core::{ImportFormat, ImportKind, ImportSpec};
use fieldrep_db::{Database, DbConfig, ImportWorkers};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fieldrep=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_help() {
    println!("fieldrep bulk import");
    println!();
    println!("Usage: import [OPTIONS] (--kind <KIND> --file <PATH>)...");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>      Database file path (default: ./fieldrep.db)");
    println!("  -k, --kind <KIND>    contacts, customers, lines, reports, visits");
    println!("  -f, --file <PATH>    File for the preceding --kind");
    println!("      --header         Files start with a header row");
    println!("      --legacy         Force comma delimiter");
    println!("      --pipe           Force pipe delimiter");
    println!("      --json           Print a JSON summary of imported rows");
    println!("  -h, --help           Show this help message");
}

#[derive(Debug, PartialEq)]
struct Options {
    db_path: String,
    has_header: bool,
    json: bool,
    format: Option<ImportFormat>,
    jobs: Vec<(ImportKind, PathBuf)>,
}

/// Parses the arguments after the program name. `Ok(None)` means help was
/// requested.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options {
        db_path: String::from("./fieldrep.db"),
        has_header: false,
        json: false,
        format: None,
        jobs: Vec::new(),
    };
    let mut pending_kind: Option<ImportKind> = None;

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", arg))
        };
        match arg.as_str() {
            "--db" | "-d" => options.db_path = value()?,
            "--kind" | "-k" => {
                pending_kind = Some(value()?.parse::<ImportKind>()?);
            }
            "--file" | "-f" => {
                let path = value()?;
                let kind = pending_kind
                    .take()
                    .ok_or("--file must follow a --kind")?;
                options.jobs.push((kind, PathBuf::from(path)));
            }
            "--header" => options.has_header = true,
            "--legacy" => options.format = Some(ImportFormat::Legacy),
            "--pipe" => options.format = Some(ImportFormat::Pipe),
            "--json" => options.json = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    if let Some(kind) = pending_kind {
        return Err(format!("--kind {} has no --file", kind));
    }
    Ok(Some(options))
}

/// Per-kind outcome of a run, printed as it is recorded.
#[derive(Debug, Default)]
struct Summary {
    failed: usize,
    entries: serde_json::Map<String, serde_json::Value>,
}

impl Summary {
    fn record<E: Display>(&mut self, kind: ImportKind, path: &Path, outcome: Result<usize, E>) {
        match outcome {
            Ok(rows) => {
                println!("✓ {}: {} rows from {}", kind, rows, path.display());
                self.entries
                    .insert(kind.to_string(), serde_json::json!({ "rows": rows }));
            }
            Err(e) => {
                self.failed += 1;
                eprintln!("✗ {} ({}): {}", kind, path.display(), e);
                self.entries
                    .insert(kind.to_string(), serde_json::json!({ "error": e.to_string() }));
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        print_help();
        return Ok(());
    };

    if options.jobs.is_empty() {
        print_help();
        return Err("nothing to import".into());
    }

    println!("fieldrep import");
    println!("===============");
    println!("Database: {}", options.db_path);
    println!();

    let db = Database::new(DbConfig::new(&options.db_path)).await?;
    let workers = ImportWorkers::new(db.clone());

    let mut summary = Summary::default();
    let mut handles = Vec::new();
    for (kind, path) in options.jobs {
        let mut spec = ImportSpec::new(kind).with_header(options.has_header);
        if let Some(format) = options.format {
            spec = spec.with_format(format);
        }
        match workers.spawn(&path, spec).await {
            Ok(handle) => handles.push((kind, path, handle)),
            Err(e) => summary.record(kind, &path, Err::<usize, _>(e)),
        }
    }

    for (kind, path, handle) in handles {
        let outcome = handle.await?;
        summary.record(kind, &path, outcome);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary.entries)?);
    }

    db.close().await;

    if summary.failed > 0 {
        return Err(format!("{} import(s) failed", summary.failed).into());
    }
    Ok(())
}
