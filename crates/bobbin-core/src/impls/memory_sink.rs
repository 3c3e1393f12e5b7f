//! MemoryEventSink - テスト・組み込み用の EventSink
//!
//! 受け取ったイベントをそのまま Vec に貯める。

use parking_lot::Mutex;

use crate::domain::{EventLevel, PoolEvent};
use crate::ports::EventSink;

#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<PoolEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far, in emission order.
    pub fn events(&self) -> Vec<PoolEvent> {
        self.events.lock().clone()
    }

    /// Events at `Warn` level or above.
    pub fn warnings(&self) -> Vec<PoolEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level() >= EventLevel::Warn)
            .cloned()
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&PoolEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &PoolEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &PoolEvent) {}
}
