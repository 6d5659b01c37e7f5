//! geoasn - ASN and organization lookup for IP addresses.
//!
//! This is the command-line interface for the geoasn library.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geoasn::{JsonFileOverrideStore, OverrideStore, Resolver, ResolverConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Get the version string for geoasn
fn get_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(env!("CARGO_PKG_VERSION"), "-UNRELEASED")
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version = get_version(), about = "ASN and organization lookup for IP addresses", long_about = None)]
struct Args {
    /// Timeout for remote HTTP and DNS lookups in milliseconds (0 disables)
    #[clap(long, global = true, default_value_t = geoasn::config::DEFAULT_LOOKUP_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Path to a MaxMind GeoLite2-ASN database
    #[clap(long, global = true)]
    geoip_db: Option<PathBuf>,

    /// JSON file holding ASN description overrides
    #[clap(long, global = true)]
    overrides_file: Option<PathBuf>,

    /// Enable verbose logging (use -vv for debug output)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the ASN and organization of an IP address
    Lookup {
        /// IPv4 address
        ip: String,

        /// Output the result in JSON format
        #[clap(long)]
        json: bool,
    },
    /// Manage ASN description overrides
    Overrides {
        #[clap(subcommand)]
        action: OverrideAction,
    },
}

#[derive(Subcommand, Debug)]
enum OverrideAction {
    /// List all overrides
    List {
        /// Output in JSON format
        #[clap(long)]
        json: bool,
    },
    /// Set the description for an ASN
    Set {
        /// ASN identifier, e.g. AS15169
        asn: String,
        /// Description to use instead of sourced data
        name: String,
    },
    /// Remove the override for an ASN
    Remove {
        /// ASN identifier, e.g. AS15169
        asn: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    if let Err(e) = runtime.block_on(async_main(args)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn async_main(args: Args) -> Result<()> {
    let config = ResolverConfig::builder()
        .timeout(Duration::from_millis(args.timeout_ms))
        .build()?;

    let store: Option<Arc<dyn OverrideStore>> = args
        .overrides_file
        .as_ref()
        .map(|path| Arc::new(JsonFileOverrideStore::new(path)) as Arc<dyn OverrideStore>);

    match args.command {
        Command::Lookup { ip, json } => {
            let resolver =
                Resolver::with_default_sources(config, args.geoip_db.as_deref(), store)?;
            let record = resolver
                .resolve(&ip)
                .await
                .with_context(|| format!("lookup of {} failed", ip))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else if record.description.is_empty() {
                println!("{}", record.asn);
            } else {
                println!("{} {}", record.asn, record.description);
            }
        }
        Command::Overrides { action } => {
            let Some(store) = store else {
                anyhow::bail!("override management requires --overrides-file");
            };
            // Override management needs no sources
            let resolver = Resolver::builder()
                .config(config)
                .override_store(store)
                .build()?;
            run_override_action(&resolver, action).await?;
        }
    }

    Ok(())
}

async fn run_override_action(resolver: &Resolver, action: OverrideAction) -> Result<()> {
    match action {
        OverrideAction::List { json } => {
            let overrides = resolver.override_list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overrides)?);
            } else {
                for o in overrides {
                    println!("{} {}", o.asn, o.name);
                }
            }
        }
        OverrideAction::Set { asn, name } => {
            resolver.override_set(&asn, &name).await?;
        }
        OverrideAction::Remove { asn } => {
            resolver.override_remove(&asn).await?;
        }
    }
    Ok(())
}
