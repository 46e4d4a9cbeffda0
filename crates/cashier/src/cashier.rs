//! # Cashier Facade
//!
//! [`Cashier`] is the only type a host talks to. It owns exactly one [`Vendor`] and
//! sequences every call the same way:
//!
//! ```text
//! validate arguments ──► initialize (bounded) ──► precondition checks ──► vendor
//!        │                      │                         │
//!   Err(CashierError)   InitializationTimedOut    PurchaseUnavailable
//!   (synchronous)          (via listener)            (via listener)
//! ```
//!
//! Contract violations are returned as `Err` before the vendor is touched. Business
//! failures always travel through the listener, and vendor-reported failures are
//! passed through unchanged.
//!
//! Initialization always completes before delegation. The wait is bounded by
//! [`CashierConfig::init_timeout`] so a vendor that never finishes its handshake
//! cannot leave a listener unfired.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time;
use tracing::{debug, error, info, instrument, warn};

use crate::builder::CashierBuilder;
use crate::completion::{CompletionEvent, CompletionHandler};
use crate::config::CashierConfig;
use crate::error::{CashierError, VendorError};
use crate::listener::{
    ConsumeListener, ConsumeOutcome, ConsumeResponder, PurchaseListener, PurchaseOutcome,
    PurchaseResponder,
};
use crate::model::{HostContext, Product, Purchase};
use crate::vendor::Vendor;

pub struct Cashier {
    host: HostContext,
    vendor: Box<dyn Vendor>,
    config: CashierConfig,
    disposed: AtomicBool,
}

impl Cashier {
    /// Starts assembling a cashier for `host`.
    pub fn builder(host: HostContext) -> CashierBuilder {
        CashierBuilder::new(host)
    }

    pub(crate) fn new(host: HostContext, vendor: Box<dyn Vendor>, config: CashierConfig) -> Self {
        Self {
            host,
            vendor,
            config,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn vendor_id(&self) -> &str {
        self.vendor.id()
    }

    pub fn config(&self) -> &CashierConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Buys `product`.
    ///
    /// Once the vendor is initialized, `available()` and `can_purchase()` are checked
    /// in that order. If either is false the listener receives
    /// `failure(product, PurchaseUnavailable)` and the vendor's `purchase` is never
    /// called. Otherwise the flow is handed to the vendor, which fires the listener
    /// exactly once (possibly after a routed completion event).
    ///
    /// # Errors
    /// [`CashierError::Disposed`] if [`dispose`](Self::dispose) was called.
    #[instrument(skip(self, product, listener), fields(vendor = self.vendor.id(), product = %product.id()))]
    pub async fn purchase<L>(&self, product: Product, listener: L) -> Result<(), CashierError>
    where
        L: PurchaseListener + 'static,
    {
        self.ensure_active()?;
        let listener: Box<dyn PurchaseListener> = Box::new(listener);

        if !self.initialize_vendor().await {
            listener.failure(product, VendorError::InitializationTimedOut);
            return Ok(());
        }

        if !self.vendor.available() || !self.vendor.can_purchase(&product) {
            warn!("Purchase unavailable");
            listener.failure(product, VendorError::PurchaseUnavailable);
            return Ok(());
        }

        debug!("Delegating purchase to vendor");
        self.vendor.purchase(&self.host, product, listener).await;
        Ok(())
    }

    /// Consumes a non-subscription `purchase`.
    ///
    /// Unlike [`purchase`](Self::purchase) there is no availability check: holding a
    /// `Purchase` implies the backend session that produced it is valid, so the
    /// vendor decides.
    ///
    /// # Errors
    /// - [`CashierError::SubscriptionNotConsumable`] for subscription purchases,
    ///   reported before the vendor is touched.
    /// - [`CashierError::Disposed`] if [`dispose`](Self::dispose) was called.
    #[instrument(skip(self, purchase, listener), fields(vendor = self.vendor.id(), product = %purchase.product_id()))]
    pub async fn consume<L>(&self, purchase: Purchase, listener: L) -> Result<(), CashierError>
    where
        L: ConsumeListener + 'static,
    {
        if purchase.is_subscription() {
            warn!("Rejecting consume of a subscription");
            return Err(CashierError::SubscriptionNotConsumable);
        }
        self.ensure_active()?;
        let listener: Box<dyn ConsumeListener> = Box::new(listener);

        if !self.initialize_vendor().await {
            listener.failure(purchase, VendorError::InitializationTimedOut);
            return Ok(());
        }

        debug!("Delegating consume to vendor");
        self.vendor.consume(&self.host, purchase, listener).await;
        Ok(())
    }

    /// [`purchase`](Self::purchase), resolved to its outcome.
    ///
    /// Completes when the listener fires, which for out-of-process flows means after
    /// the matching completion event was routed from another task.
    pub async fn purchase_outcome(&self, product: Product) -> Result<PurchaseOutcome, CashierError> {
        let (listener, outcome) = PurchaseResponder::channel();
        self.purchase(product, listener).await?;
        outcome.await.map_err(|_| CashierError::ListenerDropped)
    }

    /// [`consume`](Self::consume), resolved to its outcome.
    pub async fn consume_outcome(&self, purchase: Purchase) -> Result<ConsumeOutcome, CashierError> {
        let (listener, outcome) = ConsumeResponder::channel();
        self.consume(purchase, listener).await?;
        outcome.await.map_err(|_| CashierError::ListenerDropped)
    }

    /// Releases the vendor. Later purchase and consume calls are rejected with
    /// [`CashierError::Disposed`].
    #[instrument(skip(self), fields(vendor = self.vendor.id()))]
    pub async fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            info!("Disposing cashier");
        }
        self.vendor.dispose(&self.host).await;
    }

    /// Hands an externally-received completion event to the vendor.
    ///
    /// Returns the vendor's verdict so the host can try other handlers when it is
    /// `false`.
    pub fn route_completion_event(&self, event: &CompletionEvent) -> bool {
        let consumed = self.vendor.route_completion(event);
        debug!(
            vendor = self.vendor.id(),
            request_code = event.request_code,
            result_code = event.result_code,
            consumed,
            "Completion event routed"
        );
        consumed
    }

    fn ensure_active(&self) -> Result<(), CashierError> {
        if self.is_disposed() {
            warn!("Cashier used after dispose");
            return Err(CashierError::Disposed);
        }
        Ok(())
    }

    /// Runs the vendor handshake. Returns `false` only when the bounded wait elapsed.
    ///
    /// An initialization *failure* still counts as completed: the vendor reports it
    /// through `available()`.
    async fn initialize_vendor(&self) -> bool {
        match time::timeout(self.config.init_timeout, self.vendor.initialize(&self.host)).await {
            Ok(Ok(())) => {
                debug!("Vendor initialized");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Vendor initialization failed");
                true
            }
            Err(_) => {
                error!(
                    timeout_ms = self.config.init_timeout.as_millis() as u64,
                    "Vendor initialization timed out"
                );
                false
            }
        }
    }
}

impl CompletionHandler for Cashier {
    fn route(&self, event: &CompletionEvent) -> bool {
        self.route_completion_event(event)
    }
}
