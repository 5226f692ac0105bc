// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use gwbalancer::collector::OriginatorSource;
use gwbalancer::constants::{
    DEFAULT_DESIRED_GW_PER_SEGMENT, DEFAULT_DNS_SERVER, DEFAULT_DOMAIN, DEFAULT_MAX_AGE_SECS,
    DEFAULT_SEGMENT_COUNT,
};
use gwbalancer::context::{Config, CycleContext};
use gwbalancer::cycle::{run_cycle, CycleOutcome};
use gwbalancer::errors::CycleError;
use gwbalancer::gateway::GatewayId;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};

/// DNS load balancer for redundant mesh gateways.
///
/// Runs one decision cycle: takes a zone transfer, collects peer status,
/// decides which gateways belong in DNS per segment and writes the resulting
/// nsupdate directives.
#[derive(Debug, Parser)]
#[command(name = "gwbalancer", version, about)]
struct Cli {
    /// DNS domain carrying the gateway and segment records
    #[arg(long, default_value = DEFAULT_DOMAIN)]
    domain: String,

    /// DNS server asked for the zone transfer
    #[arg(long, default_value = DEFAULT_DNS_SERVER)]
    dns_server: String,

    /// Read the zone transfer from a file instead of running dig
    #[arg(long)]
    zone_file: Option<PathBuf>,

    /// Read the originator table from a file instead of running batctl
    #[arg(long)]
    originators_file: Option<PathBuf>,

    /// Number of gateways to keep DNS-active per segment
    #[arg(long, default_value_t = DEFAULT_DESIRED_GW_PER_SEGMENT)]
    desired_gw_per_segment: usize,

    /// Maximum age of a peer status document in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_AGE_SECS)]
    max_age: i64,

    /// Total number of traffic segments
    #[arg(long, default_value_t = DEFAULT_SEGMENT_COUNT)]
    segments: u32,

    /// Fetch peer status over the backbone network instead of public hostnames
    #[arg(long)]
    use_backbone: bool,

    /// Identity of the gateway this process runs on (e.g. gw01n03); enables
    /// mesh-based peer discovery
    #[arg(long)]
    local: Option<GatewayId>,

    /// Gateway whose local actions are rendered; defaults to --local
    #[arg(long)]
    target: Option<GatewayId>,

    /// Abandon the cycle entirely if it runs longer than this many seconds
    #[arg(long)]
    cycle_timeout: Option<u64>,

    /// Write directives to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Build Tokio runtime with custom thread names
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("gwbalancer")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to build runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async_main())
}

async fn async_main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging.
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO
    // level. Respects RUST_LOG_FORMAT for the output format (text or json).
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("starting gateway balancer cycle");

    let config = Config {
        domain: cli.domain.clone(),
        dns_server: cli.dns_server.clone(),
        desired_gw_per_segment: cli.desired_gw_per_segment,
        max_age_secs: cli.max_age,
        segment_count: cli.segments,
        use_backbone: cli.use_backbone,
        local: cli.local,
        target: cli.target,
    };

    let ctx = match CycleContext::new(config) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("failed to initialize: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match bounded_cycle(&ctx, &cli).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("cycle aborted: {err}");
            return ExitCode::from(err.exit_code());
        }
    };

    if let Err(err) = write_output(cli.output.as_deref(), &outcome.rendered).await {
        error!("failed to write directives: {err:#}");
        return ExitCode::FAILURE;
    }

    info!(
        actions = outcome.actions.len(),
        local = outcome.target_actions.len(),
        "cycle complete"
    );
    ExitCode::SUCCESS
}

/// Run the cycle, bounded by the configured deadline when one is set.
async fn bounded_cycle(ctx: &CycleContext, cli: &Cli) -> Result<CycleOutcome, CycleError> {
    let zone_text = zone_transfer(cli).await?;

    let originators = match &cli.originators_file {
        Some(path) => OriginatorSource::File(path.clone()),
        None => OriginatorSource::Command,
    };

    match cli.cycle_timeout {
        Some(secs) => {
            tokio::time::timeout(
                Duration::from_secs(secs),
                run_cycle(ctx, &zone_text, originators),
            )
            .await
            .map_err(|_| CycleError::Deadline)?
        }
        None => run_cycle(ctx, &zone_text, originators).await,
    }
}

/// Obtain the zone transfer text, from file or by running dig.
async fn zone_transfer(cli: &Cli) -> Result<String, CycleError> {
    if let Some(path) = &cli.zone_file {
        debug!(path = %path.display(), "reading zone transfer from file");
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|err| CycleError::ZoneTransfer(format!("reading {}: {err}", path.display())));
    }

    debug!(domain = %cli.domain, server = %cli.dns_server, "requesting zone transfer");
    let output = tokio::process::Command::new("dig")
        .arg("-t")
        .arg("axfr")
        .arg(&cli.domain)
        .arg(format!("@{}", cli.dns_server))
        .output()
        .await
        .map_err(|err| CycleError::ZoneTransfer(format!("running dig: {err}")))?;

    if !output.status.success() {
        return Err(CycleError::ZoneTransfer(format!(
            "dig exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Write the rendered batch to the output file, or stdout when none is set.
async fn write_output(path: Option<&std::path::Path>, rendered: &str) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
