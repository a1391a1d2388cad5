//! Repeating scheduler with a live-adjustable period.
//!
//! # States
//! ```text
//! Stopped --start()--> Running   fires once immediately, arms the timer
//! Running --stop()---> Stopped   disarms the timer
//! Running --set_period()--> Running   timer torn down and re-armed now
//! Stopped --set_period()--> Stopped   period stored, nothing fires
//! ```
//!
//! The tick callback must not block; it only launches work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Shortest period the timer accepts; a zero period cannot be armed.
const MIN_PERIOD: Duration = Duration::from_millis(1);

pub struct Scheduler {
    period: Mutex<Duration>,
    running: AtomicBool,
    timer: Mutex<Option<JoinHandle<()>>>,
    on_tick: TickFn,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("period", &self.period())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Scheduler {
    pub fn new<F>(period: Duration, on_tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            period: Mutex::new(period.max(MIN_PERIOD)),
            running: AtomicBool::new(false),
            timer: Mutex::new(None),
            on_tick: Arc::new(on_tick),
        }
    }

    pub fn period(&self) -> Duration {
        *lock(&self.period)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fire once now, then every period. Returns false if already running.
    pub fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }
        tracing::info!(period_ms = self.period().as_millis() as u64, "Scheduler started");
        (self.on_tick)();
        self.arm();
        true
    }

    /// Disarm the timer. Work already launched is not touched.
    pub fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            return false;
        }
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
        tracing::info!("Scheduler stopped");
        true
    }

    /// Change the period; a running timer is re-armed immediately.
    pub fn set_period(&self, period: Duration) {
        let period = period.max(MIN_PERIOD);
        *lock(&self.period) = period;
        tracing::info!(
            period_ms = period.as_millis() as u64,
            running = self.is_running(),
            "Scheduler period changed"
        );
        if self.is_running() {
            self.arm();
        }
    }

    fn arm(&self) {
        let period = self.period();
        let on_tick = Arc::clone(&self.on_tick);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                on_tick();
            }
        });

        let mut timer = lock(&self.timer);
        if let Some(old) = timer.replace(handle) {
            old.abort();
        }
        // A concurrent stop() may have slipped in before the new handle landed.
        if !self.is_running() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
