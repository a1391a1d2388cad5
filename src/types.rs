//! Shared probe result types.
//!
//! # Responsibilities
//! - Define the normalized outcome of one probe (`RequestResult`)
//! - Define the immutable history entry built from it (`RequestRecord`)
//! - Name the sentinel backend ids used for failed or ambiguous probes

use serde::{Deserialize, Serialize};

/// Backend id reported for any network-level failure (including timeout).
pub const ERROR_ORIGIN: &str = "error";

/// Backend id reserved for results whose origin could not be classified.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// Backend id reported when a response carried no identifying header or body field.
pub const MISSING_ORIGIN: &str = "missing origin header";

/// Return true if `id` is one of the sentinel ids rather than a real backend.
pub fn is_sentinel(id: &str) -> bool {
    id.is_empty() || id == ERROR_ORIGIN || id == UNKNOWN_ORIGIN || id == MISSING_ORIGIN
}

/// Return true if `id` may enter a mode's discovered-id set.
///
/// `missing origin header` gets a slot of its own so its markers land somewhere;
/// `error` and `unknown` never do.
pub fn is_discoverable(id: &str) -> bool {
    !id.is_empty() && id != ERROR_ORIGIN && id != UNKNOWN_ORIGIN
}

/// Normalized outcome of a single probe.
///
/// Always produced, never an error: failures are folded into the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult {
    /// ISO-8601 timestamp taken when the probe settled.
    pub timestamp: String,
    /// Backend that served the probe, or a sentinel.
    pub origin_id: String,
    /// HTTP status, `0` for network-level failure.
    pub status: u16,
    /// Human-readable failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stickiness header value that was actually sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_header_sent: Option<String>,
    /// Wall time spent on the probe.
    #[serde(default)]
    pub latency_ms: u64,
}

impl RequestResult {
    /// True for network-level failures.
    pub fn is_error(&self) -> bool {
        self.origin_id == ERROR_ORIGIN
    }

    /// True if this result may move a stickiness anchor.
    pub fn is_anchorable(&self) -> bool {
        !is_sentinel(&self.origin_id)
    }

    /// Outcome label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        if self.is_error() {
            "error"
        } else if self.origin_id == MISSING_ORIGIN {
            "missing"
        } else {
            "ok"
        }
    }
}

/// One completed probe as kept in a mode's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: String,
    pub timestamp: String,
    pub origin_id: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-mode sequence number, assigned when the probe resolves.
    pub sequence_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky_header_sent: Option<String>,
}

impl RequestRecord {
    /// Build a record from a settled probe.
    pub fn from_result(result: &RequestResult, sequence_number: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: result.timestamp.clone(),
            origin_id: result.origin_id.clone(),
            status: result.status,
            error: result.error.clone(),
            sequence_number,
            sticky_header_sent: result.sticky_header_sent.clone(),
        }
    }
}

/// Current time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
