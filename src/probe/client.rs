//! Single probe client.
//!
//! # Responsibilities
//! - Issue one GET against the routing endpoint, optionally sticky
//! - Enforce the per-probe timeout, dropping the in-flight call on expiry
//! - Normalize every outcome into a `RequestResult`

use std::time::Duration;

use reqwest::header::HeaderName;
use thiserror::Error;
use tokio::time::{timeout, Instant};
use url::Url;

use crate::config::schema::{ProbeConfig, SimulationConfig};
use crate::probe::resolve::resolve_origin_id;
use crate::probe::simulate::Simulator;
use crate::types::{now_iso, RequestResult, ERROR_ORIGIN};

/// Errors raised while building or running a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Endpoint URL could not be derived.
    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Stickiness header name is not a valid HTTP header.
    #[error("invalid header name '{0}'")]
    InvalidHeader(String),

    /// No response within the deadline.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Connection, DNS or protocol failure.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Where probes go.
#[derive(Debug, Clone)]
pub enum ProbeTarget {
    Http(Url),
    Simulated(Simulator),
}

impl std::fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeTarget::Http(url) => write!(f, "{}", url),
            ProbeTarget::Simulated(_) => f.write_str("simulated"),
        }
    }
}

/// Derive the endpoint: the override if set, else the document origin's API path.
pub fn endpoint_url(config: &ProbeConfig) -> Result<Url, ProbeError> {
    let invalid = |url: &str, e: url::ParseError| ProbeError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    };

    match config.endpoint_override.as_deref().map(str::trim) {
        Some(custom) if !custom.is_empty() => Url::parse(custom).map_err(|e| invalid(custom, e)),
        _ => Url::parse(&config.document_origin)
            .and_then(|origin| origin.join(&config.api_path))
            .map_err(|e| invalid(&config.document_origin, e)),
    }
}

/// Issues probes against one target.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    http: reqwest::Client,
    target: ProbeTarget,
    header_name: HeaderName,
    timeout: Duration,
    stickiness: bool,
}

impl ProbeClient {
    /// Build a client from configuration.
    pub fn from_config(
        probe: &ProbeConfig,
        simulation: &SimulationConfig,
        stickiness: bool,
    ) -> Result<Self, ProbeError> {
        let target = if simulation.enabled {
            ProbeTarget::Simulated(Simulator::from_config(simulation))
        } else {
            ProbeTarget::Http(endpoint_url(probe)?)
        };

        let header_name = HeaderName::from_bytes(probe.header_name.as_bytes())
            .map_err(|_| ProbeError::InvalidHeader(probe.header_name.clone()))?;

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if !probe.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            target,
            header_name,
            timeout: Duration::from_millis(probe.timeout_ms),
            stickiness,
        })
    }

    /// Same target and transport, different stickiness.
    pub fn with_stickiness(&self, stickiness: bool) -> Self {
        Self {
            stickiness,
            ..self.clone()
        }
    }

    pub fn stickiness(&self) -> bool {
        self.stickiness
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one probe.
    ///
    /// The stickiness header carries `anchor` only when stickiness is enabled
    /// and an anchor exists. Never fails: errors become an `"error"` result
    /// with status 0, still reporting the header that was sent.
    pub async fn probe(&self, anchor: Option<&str>) -> RequestResult {
        let sticky = anchor.filter(|_| self.stickiness).map(str::to_owned);
        let started = Instant::now();

        // The deadline covers simulated responses as well as real ones.
        let call = async {
            match &self.target {
                ProbeTarget::Simulated(sim) => {
                    let response = sim.respond(sticky.as_deref()).await;
                    Ok((response.status, resolve_origin_id(None, &response.body)))
                }
                ProbeTarget::Http(url) => self.fetch(url, sticky.as_deref()).await,
            }
        };
        let outcome = match timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_millis() as u64)),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok((status, origin_id)) => {
                tracing::debug!(
                    target_url = %self.target,
                    origin_id = %origin_id,
                    status,
                    latency_ms,
                    sticky = ?sticky,
                    "Probe completed"
                );
                RequestResult {
                    timestamp: now_iso(),
                    origin_id,
                    status,
                    error: None,
                    sticky_header_sent: sticky,
                    latency_ms,
                }
            }
            Err(e) => {
                tracing::warn!(
                    target_url = %self.target,
                    error = %e,
                    latency_ms,
                    sticky = ?sticky,
                    "Probe failed"
                );
                RequestResult {
                    timestamp: now_iso(),
                    origin_id: ERROR_ORIGIN.to_string(),
                    status: 0,
                    error: Some(e.to_string()),
                    sticky_header_sent: sticky,
                    latency_ms,
                }
            }
        }
    }

    async fn fetch(&self, url: &Url, sticky: Option<&str>) -> Result<(u16, String), ProbeError> {
        let mut request = self.http.get(url.clone());
        if let Some(id) = sticky {
            request = request.header(self.header_name.clone(), id);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let header = response
            .headers()
            .get(&self.header_name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = match header.as_deref() {
            Some(h) if !h.trim().is_empty() => String::new(),
            // An unreadable body simply carries no identity.
            _ => response.text().await.unwrap_or_default(),
        };

        Ok((status, resolve_origin_id(header.as_deref(), &body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_defaults_to_origin_api_path() {
        let config = ProbeConfig {
            document_origin: "https://demo.example.com".into(),
            ..ProbeConfig::default()
        };
        assert_eq!(
            endpoint_url(&config).unwrap().as_str(),
            "https://demo.example.com/api"
        );
    }

    #[test]
    fn endpoint_override_takes_precedence() {
        let config = ProbeConfig {
            endpoint_override: Some(" http://127.0.0.1:9000/custom ".into()),
            ..ProbeConfig::default()
        };
        assert_eq!(
            endpoint_url(&config).unwrap().as_str(),
            "http://127.0.0.1:9000/custom"
        );

        let blank = ProbeConfig {
            endpoint_override: Some("   ".into()),
            ..ProbeConfig::default()
        };
        assert_eq!(endpoint_url(&blank).unwrap().as_str(), "http://localhost:3000/api");
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let config = ProbeConfig {
            endpoint_override: Some("not a url".into()),
            ..ProbeConfig::default()
        };
        assert!(matches!(
            endpoint_url(&config),
            Err(ProbeError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn default_timeout_is_five_seconds() {
        let client =
            ProbeClient::from_config(&ProbeConfig::default(), &SimulationConfig::default(), false)
                .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_probe_reports_sticky_header() {
        let simulation = SimulationConfig {
            enabled: true,
            ..SimulationConfig::default()
        };
        let client = ProbeClient::from_config(&ProbeConfig::default(), &simulation, true).unwrap();

        let result = client.probe(Some("us-west-2")).await;
        assert_eq!(result.status, 200);
        assert_eq!(result.origin_id, "us-west-2");
        assert_eq!(result.sticky_header_sent.as_deref(), Some("us-west-2"));

        let plain = client.with_stickiness(false).probe(Some("us-west-2")).await;
        assert_eq!(plain.sticky_header_sent, None);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_simulated_response_hits_the_timeout() {
        let simulation = SimulationConfig {
            enabled: true,
            min_latency_ms: 8_000,
            max_latency_ms: 9_000,
            ..SimulationConfig::default()
        };
        let client = ProbeClient::from_config(&ProbeConfig::default(), &simulation, true).unwrap();

        let started = Instant::now();
        let result = client.probe(Some("eu-west-1")).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
        assert_eq!(result.origin_id, ERROR_ORIGIN);
        assert_eq!(result.status, 0);
        assert!(result.error.as_deref().unwrap().contains("timed out after 5000 ms"));
        assert_eq!(result.sticky_header_sent.as_deref(), Some("eu-west-1"));
    }
}
