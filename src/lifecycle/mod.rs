//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → main stops the scheduler
//!
//! Shutdown (shutdown.rs):
//!     main triggers → reporter and reload loops exit
//!     → in-flight probes drain → summary printed
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
