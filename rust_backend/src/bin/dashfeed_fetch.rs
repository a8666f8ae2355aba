//! dashfeed fetch tool
//!
//! Fetches one configured resource, flattens it and prints the record set.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dashfeed-fetch -- airport apt=KPIT
//! cargo run --bin dashfeed-fetch -- pilots apt=KJFK --tsv
//! ```
//!
//! # Environment Variables
//!
//! - `DASHFEED_CONFIG`: Path to a dashfeed.toml (default: search, then built-in)
//! - `DASHFEED_<PROVIDER>_API_KEY`: API key override per provider
//! - `RUST_LOG`: Log level (default: info)

use anyhow::{bail, Context, Result};
use std::env;
use std::io::{self, Write};

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dashfeed::config::DashboardConfig;
use dashfeed::io::{HttpJsonSource, ResourceRequest, ResponseLoader};

struct Cli {
    request: ResourceRequest,
    tsv: bool,
}

fn parse_cli() -> Result<Cli> {
    let mut resource = None;
    let mut params = Vec::new();
    let mut tsv = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--tsv" => tsv = true,
            "-h" | "--help" => {
                eprintln!("Usage: dashfeed-fetch <resource> [key=value ...] [--tsv]");
                std::process::exit(0);
            }
            _ if arg.starts_with("--") => bail!("Unknown flag: {}", arg),
            _ if resource.is_none() => resource = Some(arg),
            _ => {
                let (key, value) = arg
                    .split_once('=')
                    .with_context(|| format!("Expected key=value, got '{}'", arg))?;
                params.push((key.to_string(), value.to_string()));
            }
        }
    }

    let resource = resource.context("Missing resource name (try: airport apt=KPIT)")?;
    let request = params
        .into_iter()
        .fold(ResourceRequest::new(resource), |r, (k, v)| r.param(k, v));

    Ok(Cli { request, tsv })
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let cli = parse_cli()?;

    let config = DashboardConfig::load().context("Failed to load configuration")?;
    let source = HttpJsonSource::new(config.clone())?;
    let loader = ResponseLoader::with_config(source, &config);

    let result = loader
        .load(&cli.request)
        .await
        .with_context(|| format!("Failed to load '{}'", cli.request.resource))?;

    if result.is_empty() {
        warn!("'{}' returned no data", result.resource);
    }
    info!(
        "{} records, {} skipped, fetched at {}",
        result.num_records(),
        result.skipped.len(),
        result.fetched_at.to_rfc3339()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.tsv {
        result.records.write_tsv(&mut out)?;
    } else {
        serde_json::to_writer_pretty(&mut out, &result.records)?;
        writeln!(out)?;
    }
    out.flush()?;

    Ok(())
}
