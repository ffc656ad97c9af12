//! Request options and the argument check for loosely-typed callers.

use std::time::Duration;

use orientation_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options accepted by orientation requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientationOptions {
    /// Watch interval in milliseconds. Zero or absent means the hub default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,
}

impl OrientationOptions {
    pub fn with_frequency(ms: u64) -> Self {
        Self {
            frequency: Some(ms),
        }
    }

    /// Validate options that arrive as JSON.
    ///
    /// `None` and `null` give the defaults. Any other non-object value is an
    /// argument error. A `frequency` that is not a positive number is ignored.
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        let obj = match value {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                return Err(Error::Argument(format!(
                    "options must be an object, got {}",
                    json_kind(other)
                )))
            }
        };

        let frequency = obj
            .get("frequency")
            .and_then(Value::as_f64)
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .map(|ms| ms.round().max(1.0) as u64);

        Ok(Self { frequency })
    }

    /// Parse options from a JSON string.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::Argument(format!("options are not valid JSON: {}", e)))?;
        Self::from_json(Some(&value))
    }

    /// Interval a watch should tick at.
    pub fn effective_frequency(&self, default: Duration) -> Duration {
        match self.frequency {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => default,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
