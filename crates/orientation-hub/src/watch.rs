//! Recurring watches — ids and timer handles.

use std::borrow::Borrow;
use std::sync::Weak;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::hub::HubInner;
use crate::listener::{ListenerId, SuccessCallback};

/// Opaque identifier returned by `watch_orientation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchId(String);

impl WatchId {
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WatchId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An active watch: its repeating timer and the listener keeping the stream up.
pub(crate) struct WatchHandle {
    pub timer: JoinHandle<()>,
    pub listener: ListenerId,
    pub frequency: Duration,
}

impl WatchHandle {
    pub fn cancel(&self) {
        self.timer.abort();
    }
}

/// Spawn the repeating timer for a watch.
///
/// The first tick lands one full period after registration. Each tick hands
/// the hub's last sample to `on_success`; ticks before any sample has arrived
/// are skipped.
pub(crate) fn spawn_timer(
    runtime: &tokio::runtime::Handle,
    hub: Weak<HubInner>,
    id: WatchId,
    period: Duration,
    on_success: SuccessCallback,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(inner) = hub.upgrade() else {
                break;
            };
            let Some(sample) = inner.sample_for_watch(&id) else {
                if !inner.has_watch(&id) {
                    break;
                }
                debug!("Watch {} tick skipped: no sample yet", id);
                continue;
            };
            drop(inner);
            on_success(sample);
        }
    })
}
