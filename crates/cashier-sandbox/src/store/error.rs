//! Error types for the sandbox store.

use thiserror::Error;

/// Errors the store actor (or the channel to it) can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store closed")]
    StoreClosed,
    #[error("Store dropped response channel")]
    StoreDropped,
    #[error("Billing unavailable")]
    BillingUnavailable,
    #[error("Item unavailable: {0}")]
    ItemUnavailable(String),
    #[error("Item already owned: {0}")]
    ItemAlreadyOwned(String),
    #[error("Item not owned: {0}")]
    ItemNotOwned(String),
    #[error("Purchase flow {0} already in progress")]
    FlowInProgress(i32),
    #[error("No purchase flow for request code {0}")]
    UnknownFlow(i32),
    #[error("Receipt encoding failed: {0}")]
    Receipt(String),
}

impl StoreError {
    /// Numeric response code, mirroring the usual billing backend codes.
    pub fn code(&self) -> i32 {
        match self {
            StoreError::BillingUnavailable => 3,
            StoreError::ItemUnavailable(_) => 4,
            StoreError::FlowInProgress(_) | StoreError::UnknownFlow(_) => 5,
            StoreError::StoreClosed | StoreError::StoreDropped | StoreError::Receipt(_) => 6,
            StoreError::ItemAlreadyOwned(_) => 7,
            StoreError::ItemNotOwned(_) => 8,
        }
    }
}
