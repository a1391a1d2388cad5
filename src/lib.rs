//! Sticky routing probe and visualization-state engine.

// Core subsystems
pub mod config;
pub mod modes;
pub mod orchestrator;
pub mod probe;
pub mod types;

// Presentation state
pub mod animation;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::EngineConfig;
pub use lifecycle::Shutdown;
pub use modes::{Mode, ModeData, ModeManager};
pub use orchestrator::Orchestrator;
pub use types::{RequestRecord, RequestResult};
