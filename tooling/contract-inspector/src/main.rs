//! Contract inspector CLI tool
//!
//! Decodes contract payload files, prints their canonical form and
//! fingerprint, validates them against the contract schema and compares
//! two revisions of a versioned composite.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use contract_inspector::{read_payload, Inspector};
use data_contracts::ContractKind;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "contract-inspector", version)]
#[command(about = "Inspect, fingerprint and validate data contract payloads", long_about = None)]
struct Cli {
    /// Contract schema document overriding the embedded one
    #[arg(long, global = true, env = "CONTRACT_SCHEMA_PATH")]
    schema: Option<PathBuf>,

    /// Ingestion time handed to decode (RFC 3339, defaults to now)
    #[arg(long, global = true, value_parser = parse_rfc3339)]
    ingested_at: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Payload {
    /// Contract kind, e.g. data-tags or DataTagContexts
    #[arg(long, env = "CONTRACT_KIND")]
    kind: ContractKind,

    /// Payload JSON file
    #[arg(value_name = "FILE", required_unless_present = "stdin")]
    file: Option<PathBuf>,

    /// Read the payload from stdin
    #[arg(long, conflicts_with = "file")]
    stdin: bool,
}

impl Payload {
    fn read(&self) -> Result<String> {
        match &self.file {
            Some(path) => Ok(read_payload(path)?),
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read payload from stdin")?;
                Ok(buffer)
            }
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the recomputed version of a versioned composite
    Fingerprint(Payload),

    /// Print the canonical JSON of a payload
    Canonical(Payload),

    /// Validate a payload against the schema and decode it
    Validate(Payload),

    /// Check whether two payloads carry the same fingerprint
    Compare {
        #[arg(long, env = "CONTRACT_KIND")]
        kind: ContractKind,

        /// Path to the current payload
        #[arg(long)]
        current: PathBuf,

        /// Path to the proposed payload
        #[arg(long)]
        proposed: PathBuf,

        /// Fail with non-zero exit code if the fingerprint changed
        #[arg(long)]
        strict: bool,
    },
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc))
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let inspector = Inspector::new(cli.schema.as_deref(), cli.ingested_at.unwrap_or_else(Utc::now))
        .context("Failed to load contract schema")?;

    match cli.command {
        Commands::Fingerprint(payload) => {
            let version = inspector.fingerprint(payload.kind, &payload.read()?)?;
            println!("{}", version);
        }
        Commands::Canonical(payload) => {
            let canonical = inspector.canonical(payload.kind, &payload.read()?)?;
            println!("{}", canonical);
        }
        Commands::Validate(payload) => {
            let json = payload.read()?;
            match inspector.validate(payload.kind, &json) {
                Ok(inspection) => {
                    println!("✓ Valid {}", payload.kind);
                    if let Some(version) = inspection.version {
                        println!("  version: {}", version);
                    }
                }
                Err(err) => {
                    eprintln!("✗ Invalid {}", payload.kind);
                    match err.violations() {
                        Some(violations) => {
                            for violation in violations {
                                eprintln!("  - {}", violation);
                            }
                        }
                        None => eprintln!("  - {}", err),
                    }
                    process::exit(1);
                }
            }
        }
        Commands::Compare {
            kind,
            current,
            proposed,
            strict,
        } => {
            let comparison = inspector.compare(kind, &read_payload(&current)?, &read_payload(&proposed)?)?;

            println!("Current version:  {}", comparison.current_version);
            println!("Proposed version: {}", comparison.proposed_version);

            if !comparison.is_changed() {
                println!("✓ No changes to {}", kind);
            } else {
                println!("⚠ {} changed", kind);
                if strict {
                    bail!("{} fingerprint changed", kind);
                }
            }
        }
    }

    Ok(())
}
