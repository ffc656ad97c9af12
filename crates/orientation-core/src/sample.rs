//! Fused orientation samples and the raw shapes a provider delivers.

use serde::{Deserialize, Serialize};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A single fused orientation estimate.
///
/// Angles are passed through untouched from the provider; this crate never
/// computes or filters them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl OrientationSample {
    /// Build a sample. A missing or zero timestamp is replaced by the current time.
    pub fn new(azimuth: f64, pitch: f64, roll: f64, timestamp: Option<i64>) -> Self {
        let timestamp = match timestamp {
            Some(ts) if ts != 0 => ts,
            _ => now_millis(),
        };
        Self {
            azimuth,
            pitch,
            roll,
            timestamp,
        }
    }
}

/// A reading exactly as the provider hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderReading {
    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ProviderReading {
    pub fn new(azimuth: f64, pitch: f64, roll: f64, timestamp: Option<i64>) -> Self {
        Self {
            azimuth,
            pitch,
            roll,
            timestamp,
        }
    }

    /// Convert into a fresh sample, stamping it if the provider did not.
    pub fn to_sample(&self) -> OrientationSample {
        OrientationSample::new(self.azimuth, self.pitch, self.roll, self.timestamp)
    }
}

/// Lifecycle status of a sensor provider. The numeric codes double as
/// `ProviderError::code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Stopped,
    Starting,
    Running,
    FailedToStart,
}

impl ProviderStatus {
    pub fn code(&self) -> i32 {
        match self {
            Self::Stopped => 0,
            Self::Starting => 1,
            Self::Running => 2,
            Self::FailedToStart => 3,
        }
    }
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::FailedToStart => write!(f, "failed_to_start"),
        }
    }
}

/// Failure reported asynchronously by a sensor provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: i32,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The stream could not be brought up.
    pub fn failed_to_start(message: impl Into<String>) -> Self {
        Self::new(ProviderStatus::FailedToStart.code(), message)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_keeps_provider_timestamp() {
        let sample = OrientationSample::new(1.0, 2.0, 3.0, Some(1000));
        assert_eq!(sample.timestamp, 1000);
        assert_eq!(sample.azimuth, 1.0);
        assert_eq!(sample.roll, 3.0);
    }

    #[test]
    fn test_sample_stamps_missing_timestamp() {
        let before = now_millis();
        let sample = OrientationSample::new(0.0, 0.0, 0.0, None);
        assert!(sample.timestamp >= before);

        // Zero means "not supplied"
        let zero = OrientationSample::new(0.0, 0.0, 0.0, Some(0));
        assert!(zero.timestamp >= before);
    }

    #[test]
    fn test_reading_from_json() {
        let reading: ProviderReading =
            serde_json::from_str(r#"{"azimuth":1,"pitch":2,"roll":3,"timestamp":1000}"#).unwrap();
        assert_eq!(reading.to_sample(), OrientationSample::new(1.0, 2.0, 3.0, Some(1000)));

        let untimed: ProviderReading =
            serde_json::from_str(r#"{"azimuth":1,"pitch":2,"roll":3}"#).unwrap();
        assert!(untimed.timestamp.is_none());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ProviderStatus::Stopped.code(), 0);
        assert_eq!(ProviderStatus::Running.code(), 2);
        let err = ProviderError::failed_to_start("Sensor Listening could not be started");
        assert_eq!(err.code, 3);
        assert!(err.to_string().contains("code 3"));
    }
}
