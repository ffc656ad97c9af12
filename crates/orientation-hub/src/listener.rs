//! Listener registry — ordered callback pairs sharing one sensor stream.

use std::sync::Arc;

use orientation_core::{OrientationSample, ProviderError};

/// Called with each delivered sample.
pub type SuccessCallback = Arc<dyn Fn(OrientationSample) + Send + Sync>;

/// Called when the provider reports a failure.
pub type ErrorCallback = Arc<dyn Fn(ProviderError) + Send + Sync>;

/// Identity of a registered listener, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// What a listener does when the stream delivers.
#[derive(Clone)]
pub(crate) enum ListenerKind {
    /// Fulfilled by the next delivery, then detached.
    OneShot {
        on_success: SuccessCallback,
        on_error: Option<ErrorCallback>,
    },
    /// Keeps the stream alive for a watch. Samples reach the watch through its
    /// own timer, so only errors are delivered here.
    Watch { on_error: Option<ErrorCallback> },
}

#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub id: ListenerId,
    pub kind: ListenerKind,
}

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: Vec<ListenerEntry>,
    next_id: u64,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener and return its identity.
    pub fn push(&mut self, kind: ListenerKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push(ListenerEntry { id, kind });
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Copy of the current sequence, safe to iterate while callbacks mutate the set.
    pub fn snapshot(&self) -> Vec<ListenerEntry> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every listener, handing them back to the caller. Identities
    /// keep counting up so a drained id is never issued again.
    pub fn drain(&mut self) -> Vec<ListenerEntry> {
        std::mem::take(&mut self.entries)
    }
}
