//! Side-by-side sticky / non-sticky probing.

use crate::probe::client::ProbeClient;
use crate::types::RequestResult;

/// Outcome of one comparison round.
#[derive(Debug, Clone)]
pub struct DualResult {
    pub sticky: RequestResult,
    pub non_sticky: RequestResult,
}

/// Two independent probe clients, one sticky and one never sticky.
#[derive(Debug, Clone)]
pub struct DualProbeClient {
    sticky: ProbeClient,
    non_sticky: ProbeClient,
}

impl DualProbeClient {
    /// Derive both clients from one base client.
    pub fn new(base: &ProbeClient) -> Self {
        Self {
            sticky: base.with_stickiness(true),
            non_sticky: base.with_stickiness(false),
        }
    }

    pub fn sticky(&self) -> &ProbeClient {
        &self.sticky
    }

    pub fn non_sticky(&self) -> &ProbeClient {
        &self.non_sticky
    }

    /// Run both probes concurrently and wait for both to settle.
    ///
    /// `sticky_anchor` is the sticky mode's current anchor. Each side resolves
    /// on its own; a failure on one side does not touch the other.
    pub async fn probe_both(&self, sticky_anchor: Option<&str>) -> DualResult {
        let (sticky, non_sticky) =
            tokio::join!(self.sticky.probe(sticky_anchor), self.non_sticky.probe(None));
        DualResult { sticky, non_sticky }
    }
}
