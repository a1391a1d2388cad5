//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Where and how probes are sent.
    pub probe: ProbeConfig,

    /// Repeating scheduler settings.
    pub scheduler: SchedulerConfig,

    /// Initial session toggles.
    pub session: SessionConfig,

    /// Development-mode simulated endpoint.
    pub simulation: SimulationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Probe target and transport settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Origin of the page hosting the demo (e.g., "https://d123.cloudfront.net").
    pub document_origin: String,

    /// Default API path joined onto `document_origin`.
    pub api_path: String,

    /// Operator-supplied endpoint; wins over `document_origin + api_path`.
    pub endpoint_override: Option<String>,

    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Header carrying the backend identity, both ways.
    pub header_name: String,

    /// Honor HTTP(S)_PROXY environment variables.
    pub system_proxy: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            document_origin: "http://localhost:3000".to_string(),
            api_path: "/api".to_string(),
            endpoint_override: None,
            timeout_ms: 5_000,
            header_name: "x-origin-id".to_string(),
            system_proxy: true,
        }
    }
}

/// Repeating scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period between probe rounds in milliseconds.
    pub interval_ms: u64,
}

pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 60_000;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { interval_ms: 1_000 }
    }
}

/// Session toggles.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Run sticky and non-sticky probes side by side.
    pub comparison: bool,

    /// Attach the stickiness header in single mode.
    pub stickiness: bool,

    /// Records kept per mode.
    pub history_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            comparison: false,
            stickiness: false,
            history_capacity: crate::modes::HISTORY_CAPACITY,
        }
    }
}

/// Simulated endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fabricate responses locally instead of calling the network.
    pub enabled: bool,

    pub min_latency_ms: u64,

    pub max_latency_ms: u64,

    /// Backend ids the simulated edge picks from.
    pub backend_ids: Vec<String>,

    /// Serve a sticky request from the backend it names, if known.
    pub honor_stickiness: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_latency_ms: 200,
            max_latency_ms: 700,
            backend_ids: vec![
                "us-east-1".to_string(),
                "us-west-2".to_string(),
                "eu-west-1".to_string(),
                "ap-southeast-1".to_string(),
            ],
            honor_stickiness: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
