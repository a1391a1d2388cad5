//! Animation engine: the set of in-flight markers.
//!
//! # Responsibilities
//! - Spawn one marker per settled probe
//! - Drive each marker through its `Timeline` on its own task
//! - Keep a stable color per backend id
//!
//! # Design Decisions
//! - Markers are keyed by `DotId`; a task only ever touches its own entry
//! - Timing uses Tokio's clock, so tests fast-forward with a paused runtime
//! - Color is allocated at trigger time, revealed at the edge→backend leg

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::animation::colors::{ColorAllocator, NEUTRAL_COLOR};
use crate::animation::layout::{self, Point, Resolver};
use crate::animation::timeline::{Phase, Timeline, LIFETIME};
use crate::observability::metrics;

/// Identifier of one marker, unique within its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DotId(u64);

impl std::fmt::Display for DotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dot-{}", self.0)
    }
}

/// One marker replaying an already-completed probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimatedDot {
    pub id: DotId,
    pub position: Point,
    pub color: &'static str,
    pub phase: Phase,
    pub stickiness_enabled: bool,
    /// Backend the marker resolves to.
    pub origin_id: String,
}

#[derive(Debug)]
struct Shared {
    dots: DashMap<DotId, AnimatedDot>,
    colors: Mutex<ColorAllocator>,
    version: watch::Sender<u64>,
}

impl Shared {
    fn colors(&self) -> MutexGuard<'_, ColorAllocator> {
        self.colors.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

/// Owns the markers of one view (single, sticky or non-sticky).
#[derive(Debug)]
pub struct AnimationEngine {
    name: &'static str,
    next_id: AtomicU64,
    shared: Arc<Shared>,
}

impl AnimationEngine {
    pub fn new(name: &'static str) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            name,
            next_id: AtomicU64::new(1),
            shared: Arc::new(Shared {
                dots: DashMap::new(),
                colors: Mutex::new(ColorAllocator::new()),
                version,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Spawn a marker for a probe that resolved to `origin_id`.
    ///
    /// `discovered` is the owning mode's discovered-id list at trigger time and
    /// decides where the marker lands. `stickiness` is that of the probe that
    /// produced the result, not the current toggle. Must be called within a
    /// Tokio runtime.
    pub fn trigger(&self, origin_id: &str, discovered: &[String], stickiness: bool) -> DotId {
        let id = DotId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let color = self.shared.colors().allocate(origin_id);
        let target = layout::backend_position(layout::backend_slot(origin_id, discovered));
        let timeline = Timeline::new(Resolver::for_stickiness(stickiness), target);

        let first = timeline.first();
        self.shared.dots.insert(
            id,
            AnimatedDot {
                id,
                position: first.position,
                color: NEUTRAL_COLOR,
                phase: first.phase,
                stickiness_enabled: stickiness,
                origin_id: origin_id.to_string(),
            },
        );
        self.shared.bump();
        metrics::record_active_dots(self.name, self.shared.dots.len());

        tracing::debug!(
            engine = self.name,
            dot = %id,
            origin_id = %origin_id,
            color,
            "Animation triggered"
        );

        let shared = Arc::clone(&self.shared);
        let name = self.name;
        let start = Instant::now();
        tokio::spawn(async move {
            for step in timeline.steps().iter().skip(1) {
                sleep_until(start + step.at).await;
                {
                    let Some(mut dot) = shared.dots.get_mut(&id) else {
                        // Cleared by a reset.
                        return;
                    };
                    dot.position = step.position;
                    dot.phase = step.phase;
                    if step.colored {
                        dot.color = color;
                    }
                }
                shared.bump();
            }

            sleep_until(start + LIFETIME).await;
            if shared.dots.remove(&id).is_some() {
                shared.bump();
            }
            metrics::record_active_dots(name, shared.dots.len());
        });

        id
    }

    /// Snapshot of live markers, oldest first.
    pub fn dots(&self) -> Vec<AnimatedDot> {
        let mut dots: Vec<AnimatedDot> = self
            .shared
            .dots
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        dots.sort_by_key(|d| d.id);
        dots
    }

    pub fn dot(&self, id: DotId) -> Option<AnimatedDot> {
        self.shared.dots.get(&id).map(|d| d.value().clone())
    }

    pub fn active_count(&self) -> usize {
        self.shared.dots.len()
    }

    /// Color already assigned to `origin_id`, if any.
    pub fn color_of(&self, origin_id: &str) -> Option<&'static str> {
        self.shared.colors().lookup(origin_id)
    }

    /// All color assignments in insertion order.
    pub fn colors(&self) -> Vec<(String, &'static str)> {
        self.shared.colors().allocated()
    }

    /// Receiver that changes whenever any marker moves, appears or expires.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.version.subscribe()
    }

    /// Drop every marker and every color assignment.
    pub fn reset(&self) {
        self.shared.dots.clear();
        self.shared.colors().reset();
        self.shared.bump();
        metrics::record_active_dots(self.name, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::colors::{MISSING_COLOR, PALETTE};
    use crate::types::MISSING_ORIGIN;
    use std::time::Duration;
    use tokio::time::sleep;

    fn discovered(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn dot_walks_all_phases_then_expires() {
        let engine = AnimationEngine::new("single");
        let id = engine.trigger("1", &discovered(&["0", "1"]), false);

        let dot = engine.dot(id).unwrap();
        assert_eq!(dot.phase, Phase::ClientToEdge);
        assert_eq!(dot.color, NEUTRAL_COLOR);
        assert_eq!(dot.position, Point::new(200.0, 250.0));

        sleep(Duration::from_millis(450)).await;
        let dot = engine.dot(id).unwrap();
        assert_eq!(dot.phase, Phase::EdgeToResolver);
        assert_eq!(dot.position, Point::new(300.0, 250.0));

        sleep(Duration::from_millis(600)).await; // t=1050
        let dot = engine.dot(id).unwrap();
        assert_eq!(dot.phase, Phase::ResolverToEdge);
        assert_eq!(dot.color, NEUTRAL_COLOR);

        sleep(Duration::from_millis(300)).await; // t=1350
        let dot = engine.dot(id).unwrap();
        assert_eq!(dot.phase, Phase::EdgeToBackend);
        assert_eq!(dot.color, PALETTE[0]);

        sleep(Duration::from_millis(1000)).await; // t=2350
        let dot = engine.dot(id).unwrap();
        assert_eq!(dot.phase, Phase::AtBackend);
        assert_eq!(dot.position, layout::backend_position(1));

        sleep(Duration::from_millis(700)).await; // t=3050
        assert!(engine.dot(id).is_none());
        assert_eq!(engine.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_dots_are_independent() {
        let engine = AnimationEngine::new("sticky");
        let first = engine.trigger("a", &discovered(&["a"]), true);
        sleep(Duration::from_millis(1000)).await;
        let second = engine.trigger(MISSING_ORIGIN, &discovered(&["a", MISSING_ORIGIN]), true);

        sleep(Duration::from_millis(1400)).await; // first at 2400, second at 1400
        let a = engine.dot(first).unwrap();
        let b = engine.dot(second).unwrap();
        assert_eq!(a.phase, Phase::AtBackend);
        assert_eq!(b.phase, Phase::EdgeToBackend);
        assert_eq!(b.color, MISSING_COLOR);
        assert!(b.stickiness_enabled);

        sleep(Duration::from_millis(700)).await; // first expired
        let ids: Vec<DotId> = engine.dots().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second]);
    }

    #[tokio::test(start_paused = true)]
    async fn colors_survive_dot_expiry_until_reset() {
        let engine = AnimationEngine::new("single");
        engine.trigger("0", &[], false);
        engine.trigger("1", &[], false);
        sleep(LIFETIME + Duration::from_millis(10)).await;

        assert_eq!(engine.color_of("0"), Some(PALETTE[0]));
        assert_eq!(engine.color_of("1"), Some(PALETTE[1]));

        engine.trigger("0", &[], false);
        engine.reset();
        assert_eq!(engine.active_count(), 0);
        assert_eq!(engine.color_of("0"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn undiscovered_target_takes_next_slot() {
        let engine = AnimationEngine::new("single");
        let id = engine.trigger("error", &discovered(&["0", "1"]), false);
        sleep(Duration::from_millis(2350)).await;
        assert_eq!(engine.dot(id).unwrap().position, layout::backend_position(2));
    }

    #[tokio::test(start_paused = true)]
    async fn each_dot_keeps_the_stickiness_it_was_spawned_with() {
        let engine = AnimationEngine::new("single");
        let plain = engine.trigger("0", &discovered(&["0"]), false);
        let pinned = engine.trigger("0", &discovered(&["0"]), true);

        sleep(Duration::from_millis(1050)).await;
        let plain = engine.dot(plain).unwrap();
        let pinned = engine.dot(pinned).unwrap();
        assert!(!plain.stickiness_enabled);
        assert!(pinned.stickiness_enabled);
        assert_eq!(plain.phase, pinned.phase);
    }
}
