//! Scriptable provider for tests and embedding applications without hardware.

use std::sync::atomic::{AtomicUsize, Ordering};

use orientation_core::{ProviderError, ProviderReading};
use parking_lot::Mutex;

use crate::provider::{OrientationProvider, ProviderSink};

/// Provider that emits only what it is told to, and counts lifecycle calls.
#[derive(Default)]
pub struct MockProvider {
    sink: Mutex<Option<ProviderSink>>,
    last_sink: Mutex<Option<ProviderSink>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a reading on the active stream. Returns false when stopped.
    pub fn emit(&self, reading: ProviderReading) -> bool {
        match self.sink.lock().as_ref() {
            Some(sink) => sink.data(reading),
            None => false,
        }
    }

    /// Deliver a failure on the active stream. Returns false when stopped.
    pub fn fail(&self, error: ProviderError) -> bool {
        match self.sink.lock().as_ref() {
            Some(sink) => sink.error(error),
            None => false,
        }
    }

    /// Sink from the most recent `start`, kept after `stop` so late
    /// deliveries can be simulated.
    pub fn last_sink(&self) -> Option<ProviderSink> {
        self.last_sink.lock().clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.sink.lock().is_some()
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl OrientationProvider for MockProvider {
    fn start(&self, sink: ProviderSink) {
        self.starts.fetch_add(1, Ordering::SeqCst);
        *self.last_sink.lock() = Some(sink.clone());
        *self.sink.lock() = Some(sink);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        *self.sink.lock() = None;
    }
}
