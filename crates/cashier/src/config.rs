//! # Configuration
//!
//! [`CashierConfig`] carries the few knobs the orchestration layer has. It can be
//! built in code (see [`CashierBuilder`](crate::CashierBuilder)) or deserialized from
//! JSON; missing fields fall back to [`Default`].
//!
//! ```json
//! { "init_timeout_ms": 5000, "router_buffer": 16 }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CashierError;

/// Default bound on how long the cashier waits for a vendor to initialize.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the completion-router channel.
pub const DEFAULT_ROUTER_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashierConfig {
    /// Upper bound on `Vendor::initialize`. Flows fail with
    /// `VendorError::InitializationTimedOut` when it elapses.
    #[serde(rename = "init_timeout_ms", with = "millis")]
    pub init_timeout: Duration,
    /// Capacity of the inbound completion-event channel.
    pub router_buffer: usize,
}

impl Default for CashierConfig {
    fn default() -> Self {
        Self {
            init_timeout: DEFAULT_INIT_TIMEOUT,
            router_buffer: DEFAULT_ROUTER_BUFFER,
        }
    }
}

impl CashierConfig {
    pub fn from_json(json: &str) -> Result<Self, CashierError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the cashier cannot run with.
    pub fn validate(&self) -> Result<(), CashierError> {
        if self.router_buffer == 0 {
            return Err(CashierError::InvalidArgument(
                "router_buffer must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
