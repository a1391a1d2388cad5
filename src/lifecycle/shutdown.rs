//! Shutdown coordination for the CLI's background tasks.

use tokio::sync::watch;

/// Latched shutdown trigger observed by the reporter and config reload loops.
///
/// Unlike a broadcast, a listener that subscribes after `trigger()` still sees it.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of the trigger.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered, immediately if it already was.
    pub async fn recv(&mut self) {
        // An error means the coordinator is gone, which is shutdown too.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
