//! Orientation hub — shares one fused-orientation sensor stream between
//! one-shot requests and recurring watches.
//!
//! The hub starts its [`OrientationProvider`] when the first listener arrives
//! and stops it when the last one leaves. [`SimulatedProvider`] stands in for
//! platform sensors; [`MockProvider`] is scripted by tests.

pub mod config;
pub mod hub;
pub mod listener;
pub mod mock;
pub mod options;
pub mod provider;
pub mod simulated;
pub mod types;
pub mod watch;

pub use config::SimulatedProviderConfig;
pub use hub::OrientationHub;
pub use listener::{ErrorCallback, ListenerId, SuccessCallback};
pub use mock::MockProvider;
pub use options::OrientationOptions;
pub use provider::{OrientationProvider, ProviderSink};
pub use simulated::SimulatedProvider;
pub use types::*;
pub use watch::WatchId;

pub use orientation_core::{
    Error, HubConfig, OrientationSample, ProviderError, ProviderReading, ProviderStatus, Result,
};
