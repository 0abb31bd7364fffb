use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::{Failure, FailureKind, PkgdexEvent};

/// Trait for consuming events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PkgdexEvent);

    /// Shorthand for emitting a [`PkgdexEvent::Failure`].
    fn report(&self, failure: Failure) {
        self.emit(PkgdexEvent::Failure(failure));
    }
}

/// Channel-based event sink.
///
/// Sends events through a standard mpsc channel. The receiver end
/// can be polled by any consumer (progress display, test harness, etc.).
pub struct ChannelSink {
    sender: Sender<PkgdexEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<PkgdexEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PkgdexEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink for tests or headless operation.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PkgdexEvent) {}
}

/// Collector sink that stores all events for inspection.
///
/// Useful in tests to verify that expected events were emitted.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<PkgdexEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<PkgdexEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Every reported failure, in emission order.
    pub fn failures(&self) -> Vec<Failure> {
        self.events()
            .into_iter()
            .filter_map(|event| {
                match event {
                    PkgdexEvent::Failure(failure) => Some(failure),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn failures_of(&self, kind: FailureKind) -> Vec<Failure> {
        self.failures()
            .into_iter()
            .filter(|failure| failure.kind == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: PkgdexEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
