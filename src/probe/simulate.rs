//! Local-only simulated routing endpoint (development mode).
//!
//! # Responsibilities
//! - Fabricate responses without any network call
//! - Delay each response by a random latency in the configured range
//! - Pick the serving backend at random from a fixed set
//!
//! # Design Decisions
//! - Output is a plain JSON body and flows through the same identity
//!   resolution as real responses
//! - A sticky header naming a known backend is honored when configured,
//!   like the edge-side key lookup with fallback

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use crate::config::schema::SimulationConfig;

/// A fabricated response.
#[derive(Debug, Clone)]
pub struct SimulatedResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Simulator {
    min_latency: Duration,
    max_latency: Duration,
    backend_ids: Vec<String>,
    honor_stickiness: bool,
}

impl Simulator {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            min_latency: Duration::from_millis(config.min_latency_ms),
            max_latency: Duration::from_millis(config.max_latency_ms.max(config.min_latency_ms)),
            backend_ids: config.backend_ids.clone(),
            honor_stickiness: config.honor_stickiness,
        }
    }

    pub fn backend_ids(&self) -> &[String] {
        &self.backend_ids
    }

    /// Produce one response after a simulated network delay.
    pub async fn respond(&self, sticky_header: Option<&str>) -> SimulatedResponse {
        // ThreadRng is not Send; keep it out of the await.
        let (delay, picked) = {
            let mut rng = rand::thread_rng();
            let delay = rng.gen_range(self.min_latency..=self.max_latency);
            let pinned = sticky_header
                .filter(|_| self.honor_stickiness)
                .and_then(|id| self.backend_ids.iter().find(|b| *b == id));
            let picked = pinned.or_else(|| self.backend_ids.choose(&mut rng)).cloned();
            (delay, picked)
        };

        tokio::time::sleep(delay).await;

        let body = match picked {
            Some(id) => json!({
                "origin": id,
                "region": id,
                "message": format!("API response from {}", id),
                "timestamp": crate::types::now_iso(),
                "mock": true,
            }),
            None => json!({ "message": "API response", "mock": true }),
        };

        SimulatedResponse {
            status: 200,
            body: body.to_string(),
        }
    }
}
