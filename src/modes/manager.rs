//! Observable mode containers.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::modes::data::{Mode, ModeData};

/// One mode's state behind a single-writer update function.
///
/// Each update derives the next state from the state current at the moment of
/// application, never from an earlier snapshot.
#[derive(Debug)]
pub struct ModeStore {
    mode: Mode,
    tx: watch::Sender<ModeData>,
}

impl ModeStore {
    pub fn new(mode: Mode) -> Self {
        let (tx, _) = watch::channel(ModeData::default());
        Self { mode, tx }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Replace the state with `f(current)` and notify subscribers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&ModeData) -> ModeData,
    {
        self.tx.send_modify(|current| {
            let next = f(current);
            *current = next;
        });
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ModeData {
        self.tx.borrow().clone()
    }

    pub fn anchor(&self) -> Option<String> {
        self.tx.borrow().anchor.clone()
    }

    pub fn discovered(&self) -> Vec<String> {
        self.tx.borrow().discovered.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ModeData> {
        self.tx.subscribe()
    }

    pub fn reset(&self) {
        self.tx.send_replace(ModeData::default());
    }
}

/// What the presentation layer should show right now.
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentView {
    Single(ModeData),
    Comparison { sticky: ModeData, non_sticky: ModeData },
}

/// The three mode containers plus the comparison flag.
#[derive(Debug)]
pub struct ModeManager {
    comparison: AtomicBool,
    single: ModeStore,
    sticky: ModeStore,
    non_sticky: ModeStore,
}

impl ModeManager {
    pub fn new(comparison: bool) -> Self {
        Self {
            comparison: AtomicBool::new(comparison),
            single: ModeStore::new(Mode::Single),
            sticky: ModeStore::new(Mode::Sticky),
            non_sticky: ModeStore::new(Mode::NonSticky),
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.comparison.load(Ordering::SeqCst)
    }

    /// Switch views; accumulated state is left untouched.
    pub fn set_comparison(&self, enabled: bool) {
        let was = self.comparison.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            tracing::info!(comparison = enabled, "Comparison mode changed");
        }
    }

    /// Flip comparison mode, returning the new value.
    pub fn toggle_comparison(&self) -> bool {
        let enabled = !self.comparison.fetch_xor(true, Ordering::SeqCst);
        tracing::info!(comparison = enabled, "Comparison mode toggled");
        enabled
    }

    pub fn store(&self, mode: Mode) -> &ModeStore {
        match mode {
            Mode::Single => &self.single,
            Mode::Sticky => &self.sticky,
            Mode::NonSticky => &self.non_sticky,
        }
    }

    pub fn single(&self) -> &ModeStore {
        &self.single
    }

    pub fn sticky(&self) -> &ModeStore {
        &self.sticky
    }

    pub fn non_sticky(&self) -> &ModeStore {
        &self.non_sticky
    }

    pub fn update<F>(&self, mode: Mode, f: F)
    where
        F: FnOnce(&ModeData) -> ModeData,
    {
        self.store(mode).update(f);
    }

    pub fn snapshot(&self, mode: Mode) -> ModeData {
        self.store(mode).snapshot()
    }

    pub fn current(&self) -> CurrentView {
        if self.is_comparison() {
            CurrentView::Comparison {
                sticky: self.sticky.snapshot(),
                non_sticky: self.non_sticky.snapshot(),
            }
        } else {
            CurrentView::Single(self.single.snapshot())
        }
    }

    pub fn reset_all(&self) {
        for mode in Mode::ALL {
            self.store(mode).reset();
        }
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::data::HISTORY_CAPACITY;
    use crate::types::{now_iso, RequestResult};

    fn feed(store: &ModeStore, origin: &str) {
        let result = RequestResult {
            timestamp: now_iso(),
            origin_id: origin.into(),
            status: 200,
            error: None,
            sticky_header_sent: None,
            latency_ms: 0,
        };
        store.update(|prev| prev.record(&result, HISTORY_CAPACITY).0);
    }

    #[test]
    fn toggling_preserves_state() {
        let modes = ModeManager::default();
        feed(modes.single(), "0");
        feed(modes.sticky(), "1");
        feed(modes.non_sticky(), "2");
        let before: Vec<ModeData> = Mode::ALL.iter().map(|m| modes.snapshot(*m)).collect();

        assert!(modes.toggle_comparison());
        assert!(!modes.toggle_comparison());
        assert!(modes.toggle_comparison());

        let after: Vec<ModeData> = Mode::ALL.iter().map(|m| modes.snapshot(*m)).collect();
        assert_eq!(before, after);
        match modes.current() {
            CurrentView::Comparison { sticky, non_sticky } => {
                assert_eq!(sticky.discovered, vec!["1"]);
                assert_eq!(non_sticky.discovered, vec!["2"]);
            }
            other => panic!("expected comparison view, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn updates_notify_subscribers() {
        let modes = ModeManager::default();
        let mut rx = modes.single().subscribe();
        feed(modes.single(), "0");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().request_count, 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let modes = ModeManager::default();
        feed(modes.sticky(), "1");
        modes.reset_all();
        assert_eq!(modes.snapshot(Mode::Sticky), ModeData::default());
    }
}
