//! Hub status types.

use orientation_core::OrientationSample;
use serde::Serialize;

/// Whether the shared provider stream is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Stopped,
    Running,
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Point-in-time view of a hub.
#[derive(Debug, Clone, Serialize)]
pub struct HubStatus {
    pub state: StreamState,
    pub listeners: usize,
    pub watches: usize,
    #[serde(rename = "lastSample", skip_serializing_if = "Option::is_none")]
    pub last_sample: Option<OrientationSample>,
}
