//! Sticky routing probe (v1)
//!
//! Probes an edge-routed endpoint on a schedule and reports which backend
//! served each request, with or without the stickiness header.
//!
//! # Architecture Overview
//!
//! ```text
//!  ┌──────────────────────────────────────────────────────────────┐
//!  │                        STICKY PROBE                           │
//!  │                                                               │
//!  │  ┌───────────┐   tick   ┌──────────────┐   GET   ┌─────────┐  │
//!  │  │ scheduler │─────────▶│ orchestrator │────────▶│  probe  │──┼──▶ Edge
//!  │  └───────────┘          └──────┬───────┘         └─────────┘  │
//!  │                                │ settle                        │
//!  │                   ┌────────────┴────────────┐                  │
//!  │                   ▼                         ▼                  │
//!  │            ┌─────────────┐          ┌──────────────┐           │
//!  │            │    modes    │          │  animation   │           │
//!  │            │ (watchable) │          │   engines    │           │
//!  │            └──────┬──────┘          └──────────────┘           │
//!  │                   ▼                                            │
//!  │              reporter (stdout)                                 │
//!  │                                                               │
//!  │  config (+ hot reload) · observability · lifecycle            │
//!  └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;

use sticky_probe::config::{load_config, validate_config, watcher::ConfigWatcher, EngineConfig};
use sticky_probe::lifecycle::{signals::wait_for_signal, Shutdown, ShutdownSignal};
use sticky_probe::modes::{Mode, ModeData};
use sticky_probe::observability::{logging, metrics};
use sticky_probe::Orchestrator;

/// Upper bound on how long shutdown waits for probes still in flight.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Clone)]
#[command(name = "sticky-probe")]
#[command(about = "Probe sticky routing behind an edge and report backend identity", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint to probe, overriding the configured one.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Milliseconds between probe rounds.
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Probe sticky and non-sticky side by side.
    #[arg(long)]
    compare: bool,

    /// Send the stickiness header in single mode.
    #[arg(long)]
    sticky: bool,

    /// Use the local simulated endpoint instead of the network.
    #[arg(long)]
    simulate: bool,

    /// Stop after this many seconds instead of waiting for a signal.
    #[arg(short, long)]
    duration_secs: Option<u64>,

    /// Log level for this crate when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.probe.endpoint_override = Some(endpoint.clone());
        }
        if let Some(interval) = self.interval_ms {
            config.scheduler.interval_ms = interval;
        }
        if self.compare {
            config.session.comparison = true;
        }
        if self.sticky {
            config.session.stickiness = true;
        }
        if self.simulate {
            config.simulation.enabled = true;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(|errors| {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("sticky-probe v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let orchestrator = std::sync::Arc::new(Orchestrator::new(&config)?);
    let shutdown = Shutdown::new();

    let mut tasks = Vec::new();
    for mode in Mode::ALL {
        let rx = orchestrator.modes().store(mode).subscribe();
        tasks.push(tokio::spawn(report(mode, rx, shutdown.subscribe())));
    }

    // The watcher handle must outlive the reload loop.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let handle = watcher.run()?;
            let orchestrator = std::sync::Arc::clone(&orchestrator);
            let mut stop = shutdown.subscribe();
            let overrides = cli.clone();
            tasks.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        Some(mut next) = updates.recv() => {
                            overrides.apply(&mut next);
                            if let Err(e) = orchestrator.apply_config(&next) {
                                tracing::error!(error = %e, "Failed to apply reloaded config");
                            }
                        }
                        _ = stop.recv() => break,
                    }
                }
            }));
            Some(handle)
        }
        None => None,
    };

    orchestrator.start();

    match cli.duration_secs {
        Some(secs) => tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {
                tracing::info!(duration_secs = secs, "Run duration reached");
            }
            _ = wait_for_signal() => {}
        },
        None => wait_for_signal().await,
    }

    orchestrator.stop();
    if tokio::time::timeout(DRAIN_TIMEOUT, orchestrator.wait_idle())
        .await
        .is_err()
    {
        tracing::warn!(
            in_flight = orchestrator.in_flight(),
            "Probes still in flight after drain timeout"
        );
    }

    shutdown.trigger();
    for task in tasks {
        let _ = task.await;
    }

    if orchestrator.is_comparison() {
        print_summary(Mode::Sticky, &orchestrator.modes().snapshot(Mode::Sticky));
        print_summary(Mode::NonSticky, &orchestrator.modes().snapshot(Mode::NonSticky));
    } else {
        print_summary(Mode::Single, &orchestrator.modes().snapshot(Mode::Single));
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Print each record as it lands in a mode's history.
async fn report(
    mode: Mode,
    mut rx: watch::Receiver<ModeData>,
    mut stop: ShutdownSignal,
) {
    let mut printed = rx.borrow().request_count;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let data = rx.borrow_and_update().clone();
                // A reset rewinds the counter.
                if data.request_count < printed {
                    printed = 0;
                }
                for record in data.history.iter().filter(|r| r.sequence_number > printed) {
                    let sticky = record.sticky_header_sent.as_deref().unwrap_or("-");
                    match &record.error {
                        Some(error) => println!(
                            "[{:<10}] #{:<4} {:<24} status={:<3} sticky={:<12} error={}",
                            mode.as_str(), record.sequence_number, record.origin_id, record.status, sticky, error
                        ),
                        None => println!(
                            "[{:<10}] #{:<4} {:<24} status={:<3} sticky={}",
                            mode.as_str(), record.sequence_number, record.origin_id, record.status, sticky
                        ),
                    }
                }
                printed = data.request_count;
            }
            _ = stop.recv() => break,
        }
    }
}

fn print_summary(mode: Mode, data: &ModeData) {
    println!();
    println!("== {} ==", mode);
    println!("requests: {}", data.request_count);
    println!("errors:   {}", data.error_count);
    println!("anchor:   {}", data.anchor.as_deref().unwrap_or("-"));
    println!("discovered: {}", data.discovered.join(", "));
    for (origin_id, count) in data.distribution() {
        println!("  {:<24} {}", origin_id, count);
    }
}
