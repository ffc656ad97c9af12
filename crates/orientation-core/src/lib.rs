//! Orientation Core — sample types, provider errors, configuration.

pub mod config;
pub mod error;
pub mod sample;

pub use config::{HubConfig, DEFAULT_FREQUENCY_MS};
pub use error::{Error, Result};
pub use sample::{now_millis, OrientationSample, ProviderError, ProviderReading, ProviderStatus};
