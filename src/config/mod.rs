//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EngineConfig (validated)
//!     → CLI flag overrides → Orchestrator::new
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → Orchestrator::apply_config (interval, toggles, endpoint)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A reload that fails validation is dropped; the running config stays

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EngineConfig, ObservabilityConfig, ProbeConfig, SchedulerConfig, SessionConfig,
    SimulationConfig,
};
pub use validation::{validate_config, ValidationError};
