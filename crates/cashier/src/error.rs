//! # Errors
//!
//! Two error types with deliberately different delivery paths:
//!
//! - [`VendorError`] is the business-level taxonomy. It is only ever handed to a
//!   listener's `failure` callback and is never returned from a facade method.
//! - [`CashierError`] covers caller contract violations (bad arguments, consuming a
//!   subscription, a builder without a vendor, using a disposed cashier). These are
//!   returned synchronously at the call site, before any vendor interaction.

use serde::{Deserialize, Serialize};

/// Failure codes delivered through [`PurchaseListener::failure`](crate::PurchaseListener::failure)
/// and [`ConsumeListener::failure`](crate::ConsumeListener::failure).
///
/// The orchestrator itself only produces [`VendorError::PurchaseUnavailable`] and
/// [`VendorError::InitializationTimedOut`]. Everything else comes from the vendor and
/// is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorError {
    #[error("Purchase unavailable")]
    PurchaseUnavailable,
    #[error("Purchase canceled")]
    PurchaseCanceled,
    #[error("Purchase failed")]
    PurchaseFailure,
    #[error("Purchase result was malformed")]
    PurchaseSuccessResultMalformed,
    #[error("Product already owned")]
    PurchaseAlreadyOwned,
    #[error("Product not owned")]
    PurchaseNotOwned,
    #[error("Consume unavailable")]
    ConsumeUnavailable,
    #[error("Consume canceled")]
    ConsumeCanceled,
    #[error("Consume failed")]
    ConsumeFailure,
    #[error("Consumed product not owned")]
    ConsumeNotOwned,
    #[error("Vendor initialization timed out")]
    InitializationTimedOut,
    #[error("Vendor disposed")]
    Disposed,
    /// Opaque backend-specific failure.
    #[error("Backend error {code}: {message}")]
    Backend { code: i32, message: String },
}

/// Backend codes are reported as `BACKEND_CODE_BASE + code` by [`VendorError::code`],
/// clear of the fixed taxonomy codes.
pub const BACKEND_CODE_BASE: i32 = 1000;

impl VendorError {
    /// Stable numeric code, handy for logs and for hosts that bridge to integer APIs.
    ///
    /// The taxonomy uses 0 to 11. A `Backend` error with a non-negative code maps to
    /// [`BACKEND_CODE_BASE`] and above.
    pub fn code(&self) -> i32 {
        match self {
            VendorError::PurchaseUnavailable => 0,
            VendorError::PurchaseCanceled => 1,
            VendorError::PurchaseFailure => 2,
            VendorError::PurchaseSuccessResultMalformed => 3,
            VendorError::PurchaseAlreadyOwned => 4,
            VendorError::PurchaseNotOwned => 5,
            VendorError::ConsumeUnavailable => 6,
            VendorError::ConsumeCanceled => 7,
            VendorError::ConsumeFailure => 8,
            VendorError::ConsumeNotOwned => 9,
            VendorError::InitializationTimedOut => 10,
            VendorError::Disposed => 11,
            VendorError::Backend { code, .. } => BACKEND_CODE_BASE.saturating_add(*code),
        }
    }
}

/// Errors returned synchronously by the facade, the builder and the completion client.
#[derive(Debug, thiserror::Error)]
pub enum CashierError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Cannot consume a subscription purchase")]
    SubscriptionNotConsumable,
    #[error("No vendor configured")]
    VendorNotSet,
    #[error("Cashier has been disposed")]
    Disposed,
    #[error("Vendor dropped the listener without delivering an outcome")]
    ListenerDropped,
    #[error("Completion router closed")]
    RouterClosed,
    #[error("Completion router dropped response channel")]
    RouterDropped,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_codes_stay_clear_of_taxonomy() {
        let error = VendorError::Backend {
            code: 7001,
            message: "declined".into(),
        };
        assert_eq!(error.code(), 8001);
        assert_eq!(error.to_string(), "Backend error 7001: declined");

        let low = VendorError::Backend {
            code: 5,
            message: "developer error".into(),
        };
        assert_ne!(low.code(), VendorError::PurchaseNotOwned.code());
        assert_eq!(low.code(), BACKEND_CODE_BASE + 5);
    }

    #[test]
    fn taxonomy_codes_are_distinct() {
        let codes = [
            VendorError::PurchaseUnavailable,
            VendorError::PurchaseCanceled,
            VendorError::PurchaseFailure,
            VendorError::PurchaseSuccessResultMalformed,
            VendorError::PurchaseAlreadyOwned,
            VendorError::PurchaseNotOwned,
            VendorError::ConsumeUnavailable,
            VendorError::ConsumeCanceled,
            VendorError::ConsumeFailure,
            VendorError::ConsumeNotOwned,
            VendorError::InitializationTimedOut,
            VendorError::Disposed,
        ]
        .map(|e| e.code());

        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
