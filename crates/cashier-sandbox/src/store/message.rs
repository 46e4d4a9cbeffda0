//! # Store Messages
//!
//! Requests the [`StoreActor`](super::StoreActor) understands. Each one carries a
//! oneshot responder, so every request gets exactly one answer.

use cashier::{CompletionEvent, Product, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::error::StoreError;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Record of an approved purchase, serialized as the completion payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub order_id: String,
    pub package_name: String,
    pub product_id: ProductId,
    pub purchase_token: String,
    pub purchase_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_payload: Option<String>,
}

/// A purchase screen the store put in front of the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedFlow {
    pub app_id: String,
    pub request_code: i32,
    pub product_id: ProductId,
}

#[derive(Debug)]
pub enum StoreRequest {
    Connect {
        app_id: String,
        respond_to: Response<()>,
    },
    Catalog {
        respond_to: Response<Vec<Product>>,
    },
    BuyIntent {
        app_id: String,
        request_code: i32,
        product_id: ProductId,
        developer_payload: Option<String>,
        respond_to: Response<()>,
    },
    /// The user finished the purchase screen for `request_code`.
    CompleteFlow {
        app_id: String,
        request_code: i32,
        approve: bool,
        respond_to: Response<CompletionEvent>,
    },
    Consume {
        app_id: String,
        token: String,
        respond_to: Response<()>,
    },
    Owned {
        app_id: String,
        respond_to: Response<Vec<Receipt>>,
    },
    SetOnline {
        online: bool,
        respond_to: Response<()>,
    },
    /// Stops the store even while clients are still alive.
    Shutdown {
        respond_to: Response<()>,
    },
}
