//! Probe subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator tick
//!     → client.rs probe(anchor)            single mode
//!     → dual.rs probe_both(sticky_anchor)  comparison mode
//!         → HTTP GET (timeout) or simulate.rs
//!         → resolve.rs header → body → sentinel
//!     → RequestResult (never an error)
//! ```
//!
//! # Design Decisions
//! - Failures are values: the orchestrator never sees a probe error
//! - Only the network call is cancellable, by its timeout
//! - Simulated responses share the real resolution path

pub mod client;
pub mod dual;
pub mod resolve;
pub mod simulate;

pub use client::{ProbeClient, ProbeError, ProbeTarget};
pub use dual::{DualProbeClient, DualResult};
