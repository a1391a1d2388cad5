//! Phase schedule for a single marker.
//!
//! # State Transitions
//! ```text
//! t=0     client right edge          ClientToEdge
//! t=400   edge left edge             EdgeToResolver
//! t=700   below resolver             EdgeToResolver
//! t=1000  resolver                   ResolverToEdge
//! t=1300  below resolver, colored    EdgeToBackend
//! t=1600  edge center                EdgeToBackend
//! t=1900  edge right edge            EdgeToBackend
//! t=2300  backend node               AtBackend
//! t=3000  removed
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::layout::{self, Point, Resolver};

/// Total time a marker stays on screen.
pub const LIFETIME: Duration = Duration::from_millis(3000);

/// Logical leg of the probe's path; ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "client→edge")]
    ClientToEdge,
    #[serde(rename = "edge→resolver")]
    EdgeToResolver,
    #[serde(rename = "resolver→edge")]
    ResolverToEdge,
    #[serde(rename = "edge→backend")]
    EdgeToBackend,
    #[serde(rename = "at-backend")]
    AtBackend,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::ClientToEdge => "client→edge",
            Phase::EdgeToResolver => "edge→resolver",
            Phase::ResolverToEdge => "resolver→edge",
            Phase::EdgeToBackend => "edge→backend",
            Phase::AtBackend => "at-backend",
        };
        f.write_str(s)
    }
}

/// One scheduled transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Offset from marker creation.
    pub at: Duration,
    pub position: Point,
    pub phase: Phase,
    /// From this step on the marker shows its backend's color.
    pub colored: bool,
}

impl Step {
    fn new(at_ms: u64, position: Point, phase: Phase, colored: bool) -> Self {
        Self {
            at: Duration::from_millis(at_ms),
            position,
            phase,
            colored,
        }
    }
}

/// The full, precomputed step list of one marker.
#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Vec<Step>,
}

impl Timeline {
    /// Build the schedule for a marker heading to the backend at `target`.
    pub fn new(resolver: Resolver, target: Point) -> Self {
        let steps = vec![
            Step::new(0, layout::client_right(), Phase::ClientToEdge, false),
            Step::new(400, layout::edge_left(), Phase::EdgeToResolver, false),
            Step::new(700, layout::below_resolver(resolver), Phase::EdgeToResolver, false),
            Step::new(1000, layout::resolver_bottom(resolver), Phase::ResolverToEdge, false),
            Step::new(1300, layout::below_resolver(resolver), Phase::EdgeToBackend, true),
            Step::new(1600, layout::EDGE, Phase::EdgeToBackend, true),
            Step::new(1900, layout::edge_right(), Phase::EdgeToBackend, true),
            Step::new(2300, target, Phase::AtBackend, true),
        ];
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn first(&self) -> Step {
        self.steps[0]
    }

    /// The step in effect `elapsed` after creation, `None` once the marker expired.
    pub fn state_at(&self, elapsed: Duration) -> Option<Step> {
        if elapsed >= LIFETIME {
            return None;
        }
        self.steps
            .iter()
            .rev()
            .find(|step| step.at <= elapsed)
            .copied()
    }
}
