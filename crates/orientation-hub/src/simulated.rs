//! Simulated provider — a synthetic orientation sweep for demos and for
//! running without sensor hardware.
//!
//! Mirrors the lifecycle of a platform sensor: `Starting` until the first
//! reading, `Running` afterwards, and `FailedToStart` if no reading shows up
//! within the start timeout.

use std::sync::Arc;

use orientation_core::{now_millis, Error, ProviderError, ProviderReading, ProviderStatus, Result};
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SimulatedProviderConfig;
use crate::provider::{OrientationProvider, ProviderSink};

struct Shared {
    status: RwLock<ProviderStatus>,
    sink: Mutex<Option<ProviderSink>>,
}

impl Shared {
    fn emit(&self, reading: ProviderReading) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.data(reading);
        }
    }

    fn fail(&self, error: ProviderError) {
        *self.status.write() = ProviderStatus::FailedToStart;
        warn!("Simulated provider failed to start: {}", error);
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.error(error);
        }
    }
}

/// Provider emitting a synthetic, slowly rotating orientation.
pub struct SimulatedProvider {
    config: SimulatedProviderConfig,
    runtime: Handle,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedProvider {
    /// Create a provider. Must be called inside a tokio runtime.
    pub fn new(config: SimulatedProviderConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::Internal(format!("simulated provider needs a tokio runtime: {}", e))
        })?;

        Ok(Self {
            config,
            runtime,
            shared: Arc::new(Shared {
                status: RwLock::new(ProviderStatus::Stopped),
                sink: Mutex::new(None),
            }),
            task: Mutex::new(None),
        })
    }

    pub fn status(&self) -> ProviderStatus {
        *self.shared.status.read()
    }

    pub fn config(&self) -> &SimulatedProviderConfig {
        &self.config
    }
}

impl OrientationProvider for SimulatedProvider {
    fn start(&self, sink: ProviderSink) {
        *self.shared.sink.lock() = Some(sink);

        let status = self.status();
        if matches!(status, ProviderStatus::Starting | ProviderStatus::Running) {
            debug!("Simulated provider already {}, sink replaced", status);
            return;
        }

        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        *self.shared.status.write() = ProviderStatus::Starting;
        *task = Some(
            self.runtime
                .spawn(run(self.config.clone(), self.shared.clone())),
        );
        debug!("Simulated provider starting");
    }

    fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        let mut status = self.shared.status.write();
        if *status != ProviderStatus::Stopped {
            info!("Simulated provider stopped (was {})", *status);
        }
        *status = ProviderStatus::Stopped;
        drop(status);
        *self.shared.sink.lock() = None;
    }
}

impl Drop for SimulatedProvider {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn run(config: SimulatedProviderConfig, shared: Arc<Shared>) {
    if config.fail_to_start {
        shared.fail(ProviderError::failed_to_start("Not all sensors available."));
        return;
    }

    if config.startup_delay() >= config.start_timeout() {
        tokio::time::sleep(config.start_timeout()).await;
        shared.fail(ProviderError::failed_to_start(
            "Sensor Listening could not be started",
        ));
        return;
    }

    tokio::time::sleep(config.startup_delay()).await;
    *shared.status.write() = ProviderStatus::Running;
    info!(
        "Simulated provider running: one reading every {}ms",
        config.sample_interval_ms
    );

    let mut ticker = tokio::time::interval(config.sample_interval());
    let mut step: u64 = 0;
    loop {
        ticker.tick().await;
        shared.emit(synthetic_reading(&config, step));
        step = step.wrapping_add(1);
    }
}

/// Reading for the given step of the sweep.
fn synthetic_reading(config: &SimulatedProviderConfig, step: u64) -> ProviderReading {
    let t = step as f64;
    ProviderReading::new(
        (t * config.azimuth_step).rem_euclid(360.0),
        10.0 * (t * 0.1).sin(),
        5.0 * (t * 0.1).cos(),
        Some(now_millis()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StreamEvent;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn sink(session: u64) -> (ProviderSink, mpsc::UnboundedReceiver<(u64, StreamEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ProviderSink::new(session, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_then_streams() {
        let provider = SimulatedProvider::new(SimulatedProviderConfig::default()).unwrap();
        let (sink, mut rx) = sink(1);

        provider.start(sink);
        assert_eq!(provider.status(), ProviderStatus::Starting);

        let (session, event) = rx.recv().await.unwrap();
        assert_eq!(session, 1);
        assert!(matches!(event, StreamEvent::Data(ref r) if r.timestamp.is_some()));
        assert_eq!(provider.status(), ProviderStatus::Running);

        let (_, second) = rx.recv().await.unwrap();
        match second {
            StreamEvent::Data(r) => assert!((r.azimuth - 1.5).abs() < 1e-9),
            StreamEvent::Error(e) => panic!("unexpected error: {}", e),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_to_start() {
        let config = SimulatedProviderConfig {
            fail_to_start: true,
            ..Default::default()
        };
        let provider = SimulatedProvider::new(config).unwrap();
        let (sink, mut rx) = sink(1);
        provider.start(sink);

        match rx.recv().await.unwrap().1 {
            StreamEvent::Error(e) => {
                assert_eq!(e.code, ProviderStatus::FailedToStart.code());
                assert_eq!(e.message, "Not all sensors available.");
            }
            StreamEvent::Data(_) => panic!("expected an error"),
        }
        assert_eq!(provider.status(), ProviderStatus::FailedToStart);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_timeout() {
        let config = SimulatedProviderConfig {
            startup_delay_ms: 5000,
            ..Default::default()
        };
        let provider = SimulatedProvider::new(config).unwrap();
        let (sink, mut rx) = sink(1);

        let started = tokio::time::Instant::now();
        provider.start(sink);

        match rx.recv().await.unwrap().1 {
            StreamEvent::Error(e) => {
                assert_eq!(e.code, 3);
                assert_eq!(e.message, "Sensor Listening could not be started");
            }
            StreamEvent::Data(_) => panic!("expected a timeout"),
        }
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2000), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_while_running_swaps_sink() {
        let provider = SimulatedProvider::new(SimulatedProviderConfig::default()).unwrap();
        let (first, mut first_rx) = sink(1);
        let (second, mut second_rx) = sink(2);

        provider.start(first);
        first_rx.recv().await.unwrap();

        provider.start(second);
        assert_eq!(provider.status(), ProviderStatus::Running);
        let (session, _) = second_rx.recv().await.unwrap();
        assert_eq!(session, 2);

        // The first sink was released
        while first_rx.recv().await.is_some() {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_closes_stream() {
        let provider = SimulatedProvider::new(SimulatedProviderConfig::default()).unwrap();
        let (sink, mut rx) = sink(1);
        provider.start(sink);
        rx.recv().await.unwrap();

        provider.stop();
        assert_eq!(provider.status(), ProviderStatus::Stopped);
        while rx.recv().await.is_some() {}

        // Stopping twice is harmless
        provider.stop();
        assert_eq!(provider.status(), ProviderStatus::Stopped);
    }

    #[test]
    fn test_synthetic_azimuth_wraps() {
        let config = SimulatedProviderConfig::default();
        let reading = synthetic_reading(&config, 240);
        assert!((0.0..360.0).contains(&reading.azimuth));
        assert!(reading.pitch.abs() <= 10.0);
    }
}
