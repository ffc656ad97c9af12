//! Sensor provider seam.
//!
//! A provider owns the platform sensor stream. The hub calls `start` when its
//! first listener arrives and `stop` when the last one leaves. Readings and
//! errors travel back through a [`ProviderSink`], which queues them for the
//! hub's dispatcher instead of calling into the hub directly.

use orientation_core::{ProviderError, ProviderReading};
use tokio::sync::mpsc;

/// Something the provider delivered.
#[derive(Debug, Clone)]
pub(crate) enum StreamEvent {
    Data(ProviderReading),
    Error(ProviderError),
}

/// Event tagged with the stream session that produced it.
pub(crate) type SessionEvent = (u64, StreamEvent);

/// Delivery handle passed to [`OrientationProvider::start`].
///
/// Cheap to clone. Deliveries made after the hub stopped the stream, or after
/// the hub was dropped, are discarded.
#[derive(Debug, Clone)]
pub struct ProviderSink {
    session: u64,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ProviderSink {
    pub(crate) fn new(session: u64, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    /// Deliver a reading. Returns false if the hub is gone.
    pub fn data(&self, reading: ProviderReading) -> bool {
        self.tx
            .send((self.session, StreamEvent::Data(reading)))
            .is_ok()
    }

    /// Deliver a failure. Returns false if the hub is gone.
    pub fn error(&self, error: ProviderError) -> bool {
        self.tx
            .send((self.session, StreamEvent::Error(error)))
            .is_ok()
    }

    /// Whether the receiving hub has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn session(&self) -> u64 {
        self.session
    }
}

/// Platform facility producing fused orientation readings.
///
/// Both methods are called with hub state locked and must return promptly;
/// acquisition happens in the background and reports through the sink.
pub trait OrientationProvider: Send + Sync {
    /// Begin emitting readings into `sink` until [`stop`](Self::stop).
    /// Start failures are reported through [`ProviderSink::error`].
    fn start(&self, sink: ProviderSink);

    /// Halt emission. No acknowledgement.
    fn stop(&self);
}
