//! # Completion Messages
//!
//! The event a host forwards when an out-of-process flow (a store UI, a payment
//! sheet) finishes, and the request envelope the router actor receives.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Result code of a flow the user confirmed.
pub const RESULT_OK: i32 = -1;

/// Result code of a flow the user backed out of.
pub const RESULT_CANCELED: i32 = 0;

/// Externally-originated completion signal: a request/result code pair plus an
/// opaque payload (typically the backend's receipt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub request_code: i32,
    pub result_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl CompletionEvent {
    pub fn new(request_code: i32, result_code: i32, payload: Option<String>) -> Self {
        Self {
            request_code,
            result_code,
            payload,
        }
    }

    pub fn ok(request_code: i32, payload: impl Into<String>) -> Self {
        Self::new(request_code, RESULT_OK, Some(payload.into()))
    }

    pub fn canceled(request_code: i32) -> Self {
        Self::new(request_code, RESULT_CANCELED, None)
    }

    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }
}

/// Message sent to the [`CompletionRouter`](super::CompletionRouter).
#[derive(Debug)]
pub struct CompletionRequest {
    pub event: CompletionEvent,
    /// Receives `true` when a handler consumed the event.
    pub respond_to: oneshot::Sender<bool>,
}
