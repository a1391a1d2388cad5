//! Per-mode request state and its pure transitions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{is_discoverable, RequestRecord, RequestResult};

/// Default history bound.
pub const HISTORY_CAPACITY: usize = 20;

/// The three independent views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Single,
    Sticky,
    NonSticky,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Single, Mode::Sticky, Mode::NonSticky];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Single => "single",
            Mode::Sticky => "sticky",
            Mode::NonSticky => "non-sticky",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State accumulated by one mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeData {
    /// Last good backend id; sent as the stickiness header.
    pub anchor: Option<String>,
    /// Newest last, bounded.
    pub history: VecDeque<RequestRecord>,
    /// Backend ids in discovery order, no duplicates.
    pub discovered: Vec<String>,
    pub error_count: u64,
    pub last_request_at: Option<DateTime<Utc>>,
    /// Probes resolved so far; the last sequence number handed out.
    pub request_count: u64,
}

impl ModeData {
    /// Fold a settled probe into the state.
    ///
    /// Assigns the next sequence number, appends to the bounded history,
    /// records the backend as discovered and moves the anchor unless the id is
    /// a sentinel. Returns the next state and the record that was appended.
    pub fn record(&self, result: &RequestResult, capacity: usize) -> (ModeData, RequestRecord) {
        let sequence = self.request_count + 1;
        let record = RequestRecord::from_result(result, sequence);

        let mut next = self.with_discovered(&result.origin_id);
        next.history.push_back(record.clone());
        while next.history.len() > capacity {
            next.history.pop_front();
        }
        if result.is_anchorable() {
            next.anchor = Some(result.origin_id.clone());
        }
        if result.is_error() {
            next.error_count += 1;
        }
        next.last_request_at = Some(Utc::now());
        next.request_count = sequence;

        (next, record)
    }

    /// Same state with `id` discovered, if it qualifies.
    pub fn with_discovered(&self, id: &str) -> ModeData {
        let mut next = self.clone();
        if is_discoverable(id) && !next.discovered.iter().any(|d| d == id) {
            next.discovered.push(id.to_string());
        }
        next
    }

    pub fn latest(&self) -> Option<&RequestRecord> {
        self.history.back()
    }

    /// Records per backend id across the retained history, in first-seen order.
    pub fn distribution(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in &self.history {
            match counts.iter_mut().find(|(id, _)| *id == record.origin_id) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.origin_id.clone(), 1)),
            }
        }
        counts
    }
}
