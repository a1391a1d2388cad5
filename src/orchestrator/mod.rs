//! Orchestrator: the top-level driver.
//!
//! # Data Flow
//! ```text
//! scheduler.rs tick
//!     → spawn one probe round (tracked by tracker.rs)
//!         comparison off: single ProbeClient → settle(Single)
//!         comparison on:  DualProbeClient    → settle(Sticky), settle(NonSticky)
//!     → settle(): ModeManager update (history, discovery, anchor, errors)
//!               → AnimationEngine::trigger with the fresh discovered order
//! ```
//!
//! # Design Decisions
//! - Rounds are detached tasks: stopping the scheduler never cancels them
//! - Anchors are read when a round starts and written when it settles
//! - Probe clients sit behind an atomic swap so endpoint and stickiness
//!   changes never disturb a round already in flight

pub mod scheduler;
pub mod tracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::animation::AnimationEngine;
use crate::config::schema::{
    EngineConfig, ProbeConfig, SimulationConfig, MAX_INTERVAL_MS, MIN_INTERVAL_MS,
};
use crate::modes::{Mode, ModeManager};
use crate::observability::metrics;
use crate::probe::{DualProbeClient, DualResult, ProbeClient, ProbeError};
use crate::types::{RequestRecord, RequestResult};

pub use scheduler::Scheduler;
pub use tracker::ProbeTracker;

/// Probe clients for the current settings.
#[derive(Debug)]
struct Clients {
    single: ProbeClient,
    dual: DualProbeClient,
}

impl Clients {
    fn build(
        probe: &ProbeConfig,
        simulation: &SimulationConfig,
        stickiness: bool,
    ) -> Result<Self, ProbeError> {
        let base = ProbeClient::from_config(probe, simulation, stickiness)?;
        Ok(Self {
            dual: DualProbeClient::new(&base),
            single: base,
        })
    }
}

#[derive(Debug)]
struct Inner {
    modes: ModeManager,
    single_engine: AnimationEngine,
    sticky_engine: AnimationEngine,
    non_sticky_engine: AnimationEngine,
    clients: ArcSwap<Clients>,
    settings: Mutex<(ProbeConfig, SimulationConfig)>,
    stickiness: AtomicBool,
    capacity: usize,
    tracker: ProbeTracker,
}

impl Inner {
    fn engine(&self, mode: Mode) -> &AnimationEngine {
        match mode {
            Mode::Single => &self.single_engine,
            Mode::Sticky => &self.sticky_engine,
            Mode::NonSticky => &self.non_sticky_engine,
        }
    }

    async fn run_round(&self) {
        if self.modes.is_comparison() {
            self.comparison_round().await;
        } else {
            self.single_round().await;
        }
    }

    async fn single_round(&self) {
        let clients = self.clients.load_full();
        let anchor = self.modes.single().anchor();
        let result = clients.single.probe(anchor.as_deref()).await;
        self.settle(Mode::Single, &result, clients.single.stickiness());
    }

    async fn comparison_round(&self) {
        let clients = self.clients.load_full();
        let anchor = self.modes.sticky().anchor();
        let DualResult { sticky, non_sticky } = clients.dual.probe_both(anchor.as_deref()).await;
        self.settle(Mode::Sticky, &sticky, clients.dual.sticky().stickiness());
        self.settle(Mode::NonSticky, &non_sticky, clients.dual.non_sticky().stickiness());
    }

    /// Fold a result into its mode and launch its marker.
    ///
    /// `stickiness` is that of the client which ran the probe.
    fn settle(&self, mode: Mode, result: &RequestResult, stickiness: bool) -> Option<RequestRecord> {
        let mut appended = None;
        self.modes.update(mode, |prev| {
            let (next, record) = prev.record(result, self.capacity);
            appended = Some(record);
            next
        });

        let discovered = self.modes.store(mode).discovered();
        let dot = self.engine(mode).trigger(&result.origin_id, &discovered, stickiness);

        metrics::record_probe(
            mode.as_str(),
            result.outcome(),
            Duration::from_millis(result.latency_ms),
        );
        metrics::record_discovered(mode.as_str(), discovered.len());

        if let Some(record) = &appended {
            tracing::info!(
                mode = %mode,
                seq = record.sequence_number,
                origin_id = %record.origin_id,
                status = record.status,
                sticky = ?record.sticky_header_sent,
                dot = %dot,
                "Probe settled"
            );
        }
        appended
    }
}

/// Drives probing, state updates and animations.
#[derive(Debug)]
pub struct Orchestrator {
    inner: Arc<Inner>,
    scheduler: Scheduler,
}

impl Orchestrator {
    /// Build from a validated configuration. Nothing runs until `start()`.
    pub fn new(config: &EngineConfig) -> Result<Self, ProbeError> {
        let stickiness = config.session.stickiness;
        let clients = Clients::build(&config.probe, &config.simulation, stickiness)?;

        let inner = Arc::new(Inner {
            modes: ModeManager::new(config.session.comparison),
            single_engine: AnimationEngine::new(Mode::Single.as_str()),
            sticky_engine: AnimationEngine::new(Mode::Sticky.as_str()),
            non_sticky_engine: AnimationEngine::new(Mode::NonSticky.as_str()),
            clients: ArcSwap::from_pointee(clients),
            settings: Mutex::new((config.probe.clone(), config.simulation.clone())),
            stickiness: AtomicBool::new(stickiness),
            capacity: config.session.history_capacity.max(1),
            tracker: ProbeTracker::new(),
        });

        let tick_inner = Arc::clone(&inner);
        let scheduler = Scheduler::new(
            clamp_interval(Duration::from_millis(config.scheduler.interval_ms)),
            move || {
                // Tracked before spawning so a stop() right after still drains it.
                let guard = tick_inner.tracker.track();
                let inner = Arc::clone(&tick_inner);
                tokio::spawn(async move {
                    inner.run_round().await;
                    drop(guard);
                });
            },
        );

        tracing::info!(
            target_url = %inner.clients.load().single.target(),
            interval_ms = config.scheduler.interval_ms,
            comparison = config.session.comparison,
            stickiness,
            "Orchestrator ready"
        );

        Ok(Self { inner, scheduler })
    }

    /// Probe once now, then every interval. Must be called within a Tokio runtime.
    pub fn start(&self) -> bool {
        self.scheduler.start()
    }

    /// Stop scheduling; probes in flight still complete and update state.
    pub fn stop(&self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn interval(&self) -> Duration {
        self.scheduler.period()
    }

    /// Change the probe period, clamped to the supported range.
    pub fn set_interval(&self, period: Duration) {
        let clamped = clamp_interval(period);
        if clamped != period {
            tracing::warn!(
                requested_ms = period.as_millis() as u64,
                applied_ms = clamped.as_millis() as u64,
                "Probe interval out of range, clamped"
            );
        }
        self.scheduler.set_period(clamped);
    }

    /// Run one round inline, bypassing the scheduler.
    pub async fn tick_now(&self) {
        let _guard = self.inner.tracker.track();
        self.inner.run_round().await;
    }

    pub fn modes(&self) -> &ModeManager {
        &self.inner.modes
    }

    pub fn engine(&self, mode: Mode) -> &AnimationEngine {
        self.inner.engine(mode)
    }

    pub fn is_comparison(&self) -> bool {
        self.inner.modes.is_comparison()
    }

    pub fn set_comparison(&self, enabled: bool) {
        self.inner.modes.set_comparison(enabled);
    }

    pub fn toggle_comparison(&self) -> bool {
        self.inner.modes.toggle_comparison()
    }

    pub fn stickiness(&self) -> bool {
        self.inner.stickiness.load(Ordering::SeqCst)
    }

    /// Toggle the stickiness header for single mode.
    ///
    /// Rounds already in flight keep the stickiness they started with.
    pub fn set_stickiness(&self, enabled: bool) {
        let _settings = self.lock_settings();
        if self.inner.stickiness.load(Ordering::SeqCst) == enabled {
            return;
        }
        let current = self.inner.clients.load_full();
        self.inner.clients.store(Arc::new(Clients {
            single: current.single.with_stickiness(enabled),
            dual: current.dual.clone(),
        }));
        self.inner.stickiness.store(enabled, Ordering::SeqCst);
        tracing::info!(stickiness = enabled, "Single-mode stickiness changed");
    }

    /// Point probes somewhere else; `None` restores the default endpoint.
    pub fn set_endpoint_override(&self, endpoint: Option<String>) -> Result<(), ProbeError> {
        self.rebuild_clients(|probe, _| probe.endpoint_override = endpoint)
    }

    /// Apply a reloaded configuration to the live engine.
    ///
    /// History capacity is fixed for the session and is not re-read.
    pub fn apply_config(&self, config: &EngineConfig) -> Result<(), ProbeError> {
        let (probe, simulation) = self.settings();
        if probe != config.probe || simulation != config.simulation {
            self.rebuild_clients(|probe, simulation| {
                *probe = config.probe.clone();
                *simulation = config.simulation.clone();
            })?;
        }

        let period = clamp_interval(Duration::from_millis(config.scheduler.interval_ms));
        if period != self.interval() {
            self.set_interval(period);
        }
        self.set_comparison(config.session.comparison);
        self.set_stickiness(config.session.stickiness);
        Ok(())
    }

    /// Clear every mode, color table and live marker.
    pub fn reset(&self) {
        self.inner.modes.reset_all();
        for mode in Mode::ALL {
            self.inner.engine(mode).reset();
        }
        tracing::info!("Session reset");
    }

    /// Probe rounds currently in flight.
    pub fn in_flight(&self) -> u64 {
        self.inner.tracker.active_count()
    }

    /// Resolve once every in-flight round has settled.
    pub async fn wait_idle(&self) {
        self.inner.tracker.wait_idle().await;
    }

    fn settings(&self) -> (ProbeConfig, SimulationConfig) {
        self.lock_settings().clone()
    }

    /// Client swaps and stickiness changes are serialized by this lock.
    fn lock_settings(&self) -> MutexGuard<'_, (ProbeConfig, SimulationConfig)> {
        self.inner.settings.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Edit the probe settings and swap in clients built from them.
    ///
    /// On error nothing changes.
    fn rebuild_clients<F>(&self, edit: F) -> Result<(), ProbeError>
    where
        F: FnOnce(&mut ProbeConfig, &mut SimulationConfig),
    {
        let mut settings = self.lock_settings();
        let (mut probe, mut simulation) = settings.clone();
        edit(&mut probe, &mut simulation);

        let clients = Clients::build(&probe, &simulation, self.stickiness())?;
        tracing::info!(target_url = %clients.single.target(), "Probe clients rebuilt");
        self.inner.clients.store(Arc::new(clients));
        *settings = (probe, simulation);
        Ok(())
    }
}

fn clamp_interval(period: Duration) -> Duration {
    period.clamp(
        Duration::from_millis(MIN_INTERVAL_MS),
        Duration::from_millis(MAX_INTERVAL_MS),
    )
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
