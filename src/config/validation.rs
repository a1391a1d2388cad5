//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, interval bounds, latency ordering)
//! - Check that endpoint URLs and header names are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EngineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{EngineConfig, MAX_INTERVAL_MS, MIN_INTERVAL_MS};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("probe.document_origin '{0}' is not a valid URL")]
    DocumentOrigin(String),

    #[error("probe.endpoint_override '{0}' is not a valid URL")]
    EndpointOverride(String),

    #[error("probe.timeout_ms must be greater than 0")]
    ZeroTimeout,

    #[error("probe.header_name '{0}' is not a valid header name")]
    HeaderName(String),

    #[error("scheduler.interval_ms {0} outside 100..=60000")]
    Interval(u64),

    #[error("session.history_capacity must be greater than 0")]
    ZeroCapacity,

    #[error("simulation.min_latency_ms {min} exceeds max_latency_ms {max}")]
    LatencyRange { min: u64, max: u64 },

    #[error("simulation.backend_ids must not be empty when simulation is enabled")]
    NoSimulatedBackends,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let probe = &config.probe;

    if Url::parse(&probe.document_origin).is_err() {
        errors.push(ValidationError::DocumentOrigin(probe.document_origin.clone()));
    }
    if let Some(custom) = probe.endpoint_override.as_deref().map(str::trim) {
        if !custom.is_empty() && Url::parse(custom).is_err() {
            errors.push(ValidationError::EndpointOverride(custom.to_string()));
        }
    }
    if probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if reqwest::header::HeaderName::from_bytes(probe.header_name.as_bytes()).is_err() {
        errors.push(ValidationError::HeaderName(probe.header_name.clone()));
    }

    let interval = config.scheduler.interval_ms;
    if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
        errors.push(ValidationError::Interval(interval));
    }

    if config.session.history_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }

    let sim = &config.simulation;
    if sim.min_latency_ms > sim.max_latency_ms {
        errors.push(ValidationError::LatencyRange {
            min: sim.min_latency_ms,
            max: sim.max_latency_ms,
        });
    }
    if sim.enabled && sim.backend_ids.is_empty() {
        errors.push(ValidationError::NoSimulatedBackends);
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&EngineConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = EngineConfig::default();
        config.probe.timeout_ms = 0;
        config.probe.endpoint_override = Some("::nope::".into());
        config.scheduler.interval_ms = 10;
        config.session.history_capacity = 0;
        config.simulation.min_latency_ms = 900;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::Interval(10)));
        assert!(errors.contains(&ValidationError::LatencyRange { min: 900, max: 700 }));
    }

    #[test]
    fn empty_simulated_set_only_matters_when_enabled() {
        let mut config = EngineConfig::default();
        config.simulation.backend_ids.clear();
        assert!(validate_config(&config).is_ok());

        config.simulation.enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::NoSimulatedBackends])
        );
    }
}
