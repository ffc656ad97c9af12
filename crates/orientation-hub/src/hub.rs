//! Orientation hub — one shared sensor stream fanned out to many listeners.
//!
//! The stream runs exactly while at least one listener is registered. Provider
//! deliveries are queued on a channel and drained by a single dispatcher task,
//! which fans each one out over a snapshot of the listener set. Callbacks run
//! with hub state unlocked, so they may register or cancel other requests.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use orientation_core::{Error, HubConfig, OrientationSample, ProviderError, Result};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::listener::{
    ErrorCallback, ListenerEntry, ListenerId, ListenerKind, ListenerSet, SuccessCallback,
};
use crate::options::OrientationOptions;
use crate::provider::{OrientationProvider, ProviderSink, SessionEvent, StreamEvent};
use crate::types::{HubStatus, StreamState};
use crate::watch::{self, WatchHandle, WatchId};

struct HubState {
    running: bool,
    /// Bumped on every start; deliveries tagged with an older session are dropped.
    session: u64,
    listeners: ListenerSet,
    watches: HashMap<WatchId, WatchHandle>,
    last_sample: Option<OrientationSample>,
}

pub(crate) struct HubInner {
    config: HubConfig,
    provider: Arc<dyn OrientationProvider>,
    runtime: Handle,
    events: mpsc::UnboundedSender<SessionEvent>,
    state: Mutex<HubState>,
}

/// Shares one orientation provider stream between one-shot requests and
/// recurring watches. Cloning yields another handle to the same hub.
#[derive(Clone)]
pub struct OrientationHub {
    inner: Arc<HubInner>,
}

impl OrientationHub {
    /// Create a hub over `provider`. Must be called inside a tokio runtime;
    /// the dispatcher and watch timers are spawned onto it.
    pub fn new(provider: Arc<dyn OrientationProvider>, config: HubConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::Internal(format!("orientation hub needs a tokio runtime: {}", e))
        })?;
        let (events, rx) = mpsc::unbounded_channel();

        let inner = Arc::new(HubInner {
            config,
            provider,
            runtime: runtime.clone(),
            events,
            state: Mutex::new(HubState {
                running: false,
                session: 0,
                listeners: ListenerSet::new(),
                watches: HashMap::new(),
                last_sample: None,
            }),
        });

        runtime.spawn(dispatch_loop(Arc::downgrade(&inner), rx));

        info!(
            "OrientationHub initialized: default watch frequency {}ms",
            inner.config.default_frequency_ms
        );

        Ok(Self { inner })
    }

    /// Create with default configuration.
    pub fn with_provider(provider: Arc<dyn OrientationProvider>) -> Result<Self> {
        Self::new(provider, HubConfig::default())
    }

    // ---------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------

    /// Request a single reading.
    ///
    /// Exactly one of `on_success` or `on_error` fires, once, with the next
    /// delivery from the provider; the request is then detached. Options are
    /// accepted for symmetry with [`watch_orientation`](Self::watch_orientation)
    /// and otherwise ignored.
    pub fn get_current_orientation<F>(
        &self,
        on_success: F,
        on_error: Option<ErrorCallback>,
        _options: Option<OrientationOptions>,
    ) where
        F: Fn(OrientationSample) + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        let id = state.listeners.push(ListenerKind::OneShot {
            on_success: Arc::new(on_success),
            on_error,
        });
        debug!(
            "One-shot request {:?} registered ({} listeners)",
            id,
            state.listeners.len()
        );

        if !state.running {
            self.inner.start_stream(&mut state);
        }
    }

    /// Await a single reading.
    pub async fn current_orientation(&self) -> Result<OrientationSample> {
        let (tx, rx) = oneshot::channel::<Result<OrientationSample>>();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let err_tx = tx.clone();

        self.get_current_orientation(
            move |sample| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(Ok(sample));
                }
            },
            Some(Arc::new(move |err: ProviderError| {
                if let Some(tx) = err_tx.lock().take() {
                    let _ = tx.send(Err(Error::Provider(err)));
                }
            })),
            None,
        );

        rx.await
            .map_err(|_| Error::Internal("orientation request was cancelled".into()))?
    }

    /// Start a recurring watch and return its id.
    ///
    /// `on_success` is called every `options.frequency` milliseconds (default
    /// from [`HubConfig`]) with the latest sample; ticks before the first
    /// sample are skipped. If the stream is already running and a sample is
    /// known, `on_success` also fires once immediately. A provider error
    /// detaches the watch's listener and calls `on_error`; the timer keeps
    /// running until [`clear_watch`](Self::clear_watch).
    pub fn watch_orientation<F>(
        &self,
        on_success: F,
        on_error: Option<ErrorCallback>,
        options: Option<OrientationOptions>,
    ) -> WatchId
    where
        F: Fn(OrientationSample) + Send + Sync + 'static,
    {
        let period = options
            .unwrap_or_default()
            .effective_frequency(self.inner.config.default_frequency());
        let on_success: SuccessCallback = Arc::new(on_success);

        let mut state = self.inner.state.lock();
        let id = loop {
            let candidate = WatchId::generate();
            if !state.watches.contains_key(&candidate) {
                break candidate;
            }
        };

        let listener = state.listeners.push(ListenerKind::Watch { on_error });
        let timer = watch::spawn_timer(
            &self.inner.runtime,
            Arc::downgrade(&self.inner),
            id.clone(),
            period,
            on_success.clone(),
        );

        let immediate = if state.running {
            state.last_sample
        } else {
            self.inner.start_stream(&mut state);
            None
        };

        state.watches.insert(
            id.clone(),
            WatchHandle {
                timer,
                listener,
                frequency: period,
            },
        );
        info!(
            "Watch {} registered every {}ms ({} watches)",
            id,
            period.as_millis(),
            state.watches.len()
        );
        drop(state);

        if let Some(sample) = immediate {
            on_success(sample);
        }

        id
    }

    /// Cancel a watch. Unknown, empty, or already-cleared ids are ignored.
    pub fn clear_watch(&self, id: impl AsRef<str>) {
        let id = id.as_ref();
        if id.is_empty() {
            return;
        }

        let mut state = self.inner.state.lock();
        let Some(handle) = state.watches.remove(id) else {
            debug!("clear_watch: no active watch {}", id);
            return;
        };

        handle.cancel();
        self.inner.detach_locked(&mut state, handle.listener);
        info!("Watch {} cleared ({} watches)", id, state.watches.len());
    }

    /// Cancel every watch and drop every pending request without calling
    /// back, then stop the stream.
    pub fn reset(&self) {
        let (watches, listeners) = {
            let mut state = self.inner.state.lock();
            let watches: Vec<WatchHandle> = state.watches.drain().map(|(_, h)| h).collect();
            for handle in &watches {
                handle.cancel();
            }
            let listeners = state.listeners.drain();
            if state.running {
                self.inner.stop_stream(&mut state);
            }
            (watches, listeners)
        };

        info!(
            "Hub reset: {} watches cancelled, {} listeners dropped",
            watches.len(),
            listeners.len()
        );
    }

    // ---------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn listener_count(&self) -> usize {
        self.inner.state.lock().listeners.len()
    }

    pub fn watch_count(&self) -> usize {
        self.inner.state.lock().watches.len()
    }

    /// Interval of an active watch.
    pub fn watch_frequency(&self, id: impl AsRef<str>) -> Option<Duration> {
        self.inner
            .state
            .lock()
            .watches
            .get(id.as_ref())
            .map(|h| h.frequency)
    }

    /// Most recent sample delivered by the provider.
    pub fn last_sample(&self) -> Option<OrientationSample> {
        self.inner.state.lock().last_sample
    }

    pub fn status(&self) -> HubStatus {
        let state = self.inner.state.lock();
        HubStatus {
            state: if state.running {
                StreamState::Running
            } else {
                StreamState::Stopped
            },
            listeners: state.listeners.len(),
            watches: state.watches.len(),
            last_sample: state.last_sample,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }
}

impl HubInner {
    fn start_stream(&self, state: &mut HubState) {
        state.session += 1;
        state.running = true;
        info!("Starting orientation stream (session {})", state.session);
        self.provider
            .start(ProviderSink::new(state.session, self.events.clone()));
    }

    fn stop_stream(&self, state: &mut HubState) {
        self.provider.stop();
        state.running = false;
        info!("Stopped orientation stream (session {})", state.session);
    }

    /// Remove a listener, stopping the stream if it was the last one.
    /// Returns false if the listener was already gone.
    fn detach_locked(&self, state: &mut HubState, id: ListenerId) -> bool {
        if !state.listeners.remove(id) {
            return false;
        }
        if state.listeners.is_empty() && state.running {
            self.stop_stream(state);
        }
        true
    }

    fn detach(&self, id: ListenerId) -> bool {
        let mut state = self.state.lock();
        self.detach_locked(&mut state, id)
    }

    pub(crate) fn sample_for_watch(&self, id: &WatchId) -> Option<OrientationSample> {
        let state = self.state.lock();
        if state.watches.contains_key(id) {
            state.last_sample
        } else {
            None
        }
    }

    pub(crate) fn has_watch(&self, id: &WatchId) -> bool {
        self.state.lock().watches.contains_key(id)
    }

    fn dispatch(&self, session: u64, event: StreamEvent) {
        let (snapshot, delivery) = {
            let mut state = self.state.lock();
            if !state.running || state.session != session {
                debug!(
                    "Dropping delivery from stale session {} (current {}, running={})",
                    session, state.session, state.running
                );
                return;
            }

            let delivery = match event {
                StreamEvent::Data(reading) => {
                    let sample = reading.to_sample();
                    state.last_sample = Some(sample);
                    Ok(sample)
                }
                StreamEvent::Error(err) => Err(err),
            };
            (state.listeners.snapshot(), delivery)
        };

        match delivery {
            Ok(sample) => {
                debug!("Delivering sample to {} listeners", snapshot.len());
                for entry in &snapshot {
                    self.deliver_sample(entry, sample);
                }
            }
            Err(err) => {
                warn!(
                    "Orientation provider error, notifying {} listeners: {}",
                    snapshot.len(),
                    err
                );
                for entry in &snapshot {
                    self.deliver_error(entry, &err);
                }
            }
        }
    }

    fn deliver_sample(&self, entry: &ListenerEntry, sample: OrientationSample) {
        match &entry.kind {
            ListenerKind::OneShot { on_success, .. } => {
                if self.detach(entry.id) {
                    on_success(sample);
                }
            }
            ListenerKind::Watch { .. } => {}
        }
    }

    fn deliver_error(&self, entry: &ListenerEntry, err: &ProviderError) {
        let on_error = match &entry.kind {
            ListenerKind::OneShot { on_error, .. } => on_error,
            ListenerKind::Watch { on_error } => on_error,
        };
        if self.detach(entry.id) {
            if let Some(on_error) = on_error {
                on_error(err.clone());
            }
        }
    }
}

impl Drop for HubInner {
    fn drop(&mut self) {
        let running = {
            let state = self.state.get_mut();
            for handle in state.watches.values() {
                handle.cancel();
            }
            std::mem::replace(&mut state.running, false)
        };
        if running {
            self.provider.stop();
        }
    }
}

async fn dispatch_loop(hub: Weak<HubInner>, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some((session, event)) = rx.recv().await {
        let Some(inner) = hub.upgrade() else {
            break;
        };
        inner.dispatch(session, event);
    }
    debug!("Orientation dispatcher exited");
}
