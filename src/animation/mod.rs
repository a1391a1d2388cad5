//! Animation subsystem.
//!
//! # Data Flow
//! ```text
//! Probe settled (orchestrator)
//!     → engine.rs trigger(origin_id, discovered, stickiness)
//!         → colors.rs allocate color
//!         → layout.rs compute backend slot
//!         → timeline.rs build step list
//!     → per-marker task walks the steps, then removes the marker
//!
//! Presentation layer:
//!     → engine.dots() snapshot / engine.subscribe() change feed
//!     → engine.color_of(origin_id)
//! ```
//!
//! # Design Decisions
//! - One engine per view, each with its own color table
//! - Markers never interact; each is addressed by its own id
//! - A marker's whole schedule is fixed at creation

pub mod colors;
pub mod engine;
pub mod layout;
pub mod timeline;

pub use colors::ColorAllocator;
pub use engine::{AnimatedDot, AnimationEngine, DotId};
pub use layout::Point;
pub use timeline::Phase;
