//! # Vendor Trait
//!
//! A [`Vendor`] is one billing backend behind the [`Cashier`](crate::Cashier) facade.
//! The cashier never knows which backend it talks to; it only sequences calls on
//! this trait.
//!
//! ## Contract
//!
//! - [`initialize`](Vendor::initialize) resolves exactly once per call, on success
//!   *and* on failure. After a failure, [`available`](Vendor::available) must return
//!   `false`. Repeated or overlapping calls must be coalesced: the backend handshake
//!   runs once, every caller sees the result.
//! - [`can_purchase`](Vendor::can_purchase) is only meaningful once `available()` is
//!   true.
//! - [`purchase`](Vendor::purchase) and [`consume`](Vendor::consume) deliver exactly
//!   one terminal callback on the listener they were handed. Business failures go
//!   through the listener and are never returned.
//! - [`route_completion`](Vendor::route_completion) returns `true` only when the
//!   event matched, and completed, exactly one pending flow. Unknown events are a
//!   no-op returning `false`, so hosts can chain several handlers.
//! - [`dispose`](Vendor::dispose) is idempotent. Pending flows are failed with
//!   [`VendorError::Disposed`] before resources are released.

use std::sync::Arc;

use async_trait::async_trait;

use crate::completion::CompletionEvent;
use crate::error::VendorError;
use crate::listener::{ConsumeListener, PurchaseListener};
use crate::logging::Logger;
use crate::model::{HostContext, Product, Purchase};

#[async_trait]
pub trait Vendor: Send + Sync + 'static {
    /// Backend identifier, used in logs (e.g. `"sandbox"`).
    fn id(&self) -> &str;

    /// Performs the backend handshake (connection, capability negotiation).
    async fn initialize(&self, host: &HostContext) -> Result<(), VendorError>;

    /// True after a successful `initialize` while the backend channel is usable.
    fn available(&self) -> bool;

    /// Vendor-specific eligibility of `product` (catalog membership, region, ...).
    fn can_purchase(&self, product: &Product) -> bool;

    /// Begins a purchase flow. The outcome may arrive later, through a routed
    /// completion event.
    async fn purchase(
        &self,
        host: &HostContext,
        product: Product,
        listener: Box<dyn PurchaseListener>,
    );

    /// Consumes a non-subscription purchase.
    async fn consume(&self, host: &HostContext, purchase: Purchase, listener: Box<dyn ConsumeListener>);

    /// Completes the pending flow matching `event`, if any.
    fn route_completion(&self, event: &CompletionEvent) -> bool;

    /// Releases backend resources.
    async fn dispose(&self, host: &HostContext);

    /// Installs a diagnostic sink. Has no behavioral effect.
    fn set_logger(&mut self, _logger: Arc<dyn Logger>) {}
}
