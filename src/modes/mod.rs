//! Mode management subsystem.
//!
//! # Data Flow
//! ```text
//! Probe settled
//!     → manager.rs store(mode).update(|prev| next)
//!         → data.rs record(): sequence, bounded history, discovery, anchor
//!     → watch channel notifies subscribers (presentation, CLI reporter)
//! ```
//!
//! # Design Decisions
//! - Three independent containers: single, sticky, non-sticky
//! - Transitions are pure functions of the previous state
//! - Switching views never resets any container

pub mod data;
pub mod manager;

pub use data::{Mode, ModeData, HISTORY_CAPACITY};
pub use manager::{CurrentView, ModeManager, ModeStore};
