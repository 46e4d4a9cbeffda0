//! # Sandbox Vendor
//!
//! [`SandboxVendor`] plugs the sandbox store into the [`Cashier`] facade. It shows
//! the shape every out-of-process vendor takes:
//!
//! 1. `initialize` connects once and caches the catalog. Concurrent callers share the
//!    same handshake.
//! 2. `purchase` allocates a request code, parks the listener under it and asks the
//!    store to show its purchase screen. Nothing is reported until the host routes
//!    the matching [`CompletionEvent`] back.
//! 3. `route_completion` takes the parked listener, verifies the receipt and fires
//!    exactly one callback.
//!
//! ```rust,ignore
//! let cashier = for_sandbox(host, Some("player-42".into()), store_client)
//!     .logger(Arc::new(TracingLogger::new("sandbox")))
//!     .build()?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use cashier::{
    Cashier, CashierBuilder, CompletionEvent, ConsumeListener, HostContext, Logger, Product,
    ProductId, Purchase, PurchaseListener, Vendor, VendorError, RESULT_CANCELED, RESULT_OK,
};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn, Level};

use crate::store::{Receipt, StoreClient, StoreError};

pub const SANDBOX_VENDOR_ID: &str = "sandbox";

/// First request code handed to a purchase flow.
pub const FIRST_REQUEST_CODE: i32 = 1001;

struct PendingPurchase {
    product: Product,
    listener: Box<dyn PurchaseListener>,
}

pub struct SandboxVendor {
    app_id: String,
    developer_payload: Option<String>,
    store: StoreClient,
    catalog: OnceCell<HashMap<ProductId, Product>>,
    pending: Mutex<HashMap<i32, PendingPurchase>>,
    next_request_code: AtomicI32,
    disposed: AtomicBool,
    logger: Option<Arc<dyn Logger>>,
}

impl SandboxVendor {
    /// Creates a vendor selling on behalf of `app_id`. Every purchase carries
    /// `developer_payload`, and receipts must echo it back.
    pub fn new(
        app_id: impl Into<String>,
        developer_payload: Option<String>,
        store: StoreClient,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            developer_payload,
            store,
            catalog: OnceCell::new(),
            pending: Mutex::new(HashMap::new()),
            next_request_code: AtomicI32::new(FIRST_REQUEST_CODE),
            disposed: AtomicBool::new(false),
            logger: None,
        }
    }

    /// Number of purchase flows waiting for a completion event.
    pub fn pending_flows(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<i32, PendingPurchase>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn diagnostic(&self, level: Level, message: &str) {
        if let Some(logger) = &self.logger {
            logger.log(level, message);
        }
    }

    async fn connect(&self) -> Result<HashMap<ProductId, Product>, StoreError> {
        self.store.connect(&self.app_id).await?;
        let products = self.store.catalog().await?;
        Ok(products
            .into_iter()
            .map(|product| (product.id().clone(), product))
            .collect())
    }

    /// Parses the completion payload and checks it belongs to this app, this
    /// product and this developer payload.
    fn verify_receipt(&self, product: &Product, payload: Option<&str>) -> Option<Receipt> {
        let receipt: Receipt = serde_json::from_str(payload?).ok()?;
        let genuine = receipt.package_name == self.app_id
            && receipt.product_id == *product.id()
            && receipt.developer_payload == self.developer_payload;
        genuine.then_some(receipt)
    }
}

#[async_trait]
impl Vendor for SandboxVendor {
    fn id(&self) -> &str {
        SANDBOX_VENDOR_ID
    }

    async fn initialize(&self, _host: &HostContext) -> Result<(), VendorError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(VendorError::Disposed);
        }
        match self.catalog.get_or_try_init(|| self.connect()).await {
            Ok(catalog) => {
                debug!(products = catalog.len(), "Sandbox ready");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Sandbox initialization failed");
                self.diagnostic(Level::WARN, &format!("initialization failed: {}", e));
                Err(purchase_error(e))
            }
        }
    }

    fn available(&self) -> bool {
        self.catalog.initialized()
            && !self.disposed.load(Ordering::SeqCst)
            && !self.store.is_closed()
    }

    fn can_purchase(&self, product: &Product) -> bool {
        self.catalog
            .get()
            .is_some_and(|catalog| catalog.contains_key(product.id()))
    }

    async fn purchase(
        &self,
        _host: &HostContext,
        product: Product,
        listener: Box<dyn PurchaseListener>,
    ) {
        let request_code = self.next_request_code.fetch_add(1, Ordering::SeqCst);
        let product_id = product.id().clone();
        // Parked before the screen opens, so an early completion still finds it.
        // The disposed flag is read under the same lock `dispose` drains with.
        let rejected = {
            let mut pending = self.pending();
            if self.disposed.load(Ordering::SeqCst) {
                Some(PendingPurchase { product, listener })
            } else {
                pending.insert(request_code, PendingPurchase { product, listener });
                None
            }
        };
        if let Some(PendingPurchase { product, listener }) = rejected {
            listener.failure(product, VendorError::Disposed);
            return;
        }

        let launched = self
            .store
            .buy_intent(
                &self.app_id,
                request_code,
                product_id.clone(),
                self.developer_payload.clone(),
            )
            .await;

        match launched {
            Ok(()) => {
                info!(request_code, %product_id, "Waiting for purchase completion");
                self.diagnostic(
                    Level::DEBUG,
                    &format!("purchase flow {} launched for {}", request_code, product_id),
                );
            }
            Err(e) => {
                warn!(request_code, %product_id, error = %e, "Purchase flow not launched");
                let parked = self.pending().remove(&request_code);
                if let Some(PendingPurchase { product, listener }) = parked {
                    listener.failure(product, purchase_error(e));
                }
            }
        }
    }

    async fn consume(
        &self,
        _host: &HostContext,
        purchase: Purchase,
        listener: Box<dyn ConsumeListener>,
    ) {
        if self.disposed.load(Ordering::SeqCst) {
            listener.failure(purchase, VendorError::Disposed);
            return;
        }

        match self.store.consume(&self.app_id, purchase.token()).await {
            Ok(()) => {
                info!(order_id = purchase.order_id(), "Purchase consumed");
                listener.success(purchase);
            }
            Err(e) => {
                warn!(order_id = purchase.order_id(), error = %e, "Consume failed");
                listener.failure(purchase, consume_error(e));
            }
        }
    }

    fn route_completion(&self, event: &CompletionEvent) -> bool {
        let parked = self.pending().remove(&event.request_code);
        let Some(PendingPurchase { product, listener }) = parked else {
            debug!(request_code = event.request_code, "Not a sandbox flow");
            return false;
        };

        let request_code = event.request_code;
        match event.result_code {
            RESULT_OK => match self.verify_receipt(&product, event.payload.as_deref()) {
                Some(receipt) => {
                    info!(request_code, order_id = %receipt.order_id, "Purchase completed");
                    let payload = event.payload.clone().unwrap_or_default();
                    let purchase = Purchase::new(
                        product,
                        receipt.order_id,
                        receipt.purchase_token,
                        payload,
                    )
                    .with_developer_payload(receipt.developer_payload);
                    listener.success(purchase);
                }
                None => {
                    warn!(request_code, "Completion receipt rejected");
                    self.diagnostic(
                        Level::WARN,
                        &format!("receipt for flow {} failed verification", request_code),
                    );
                    listener.failure(product, VendorError::PurchaseSuccessResultMalformed);
                }
            },
            RESULT_CANCELED => {
                info!(request_code, "Purchase canceled");
                listener.failure(product, VendorError::PurchaseCanceled);
            }
            other => {
                warn!(request_code, result_code = other, "Purchase failed");
                listener.failure(product, VendorError::PurchaseFailure);
            }
        }
        true
    }

    async fn dispose(&self, _host: &HostContext) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let abandoned: Vec<PendingPurchase> =
            self.pending().drain().map(|(_, pending)| pending).collect();
        info!(abandoned = abandoned.len(), "Sandbox vendor disposed");
        for PendingPurchase { product, listener } in abandoned {
            listener.failure(product, VendorError::Disposed);
        }
        self.diagnostic(Level::INFO, "disposed");
    }

    fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = Some(logger);
    }
}

/// Starts a [`CashierBuilder`] wired to a [`SandboxVendor`] selling as `host`.
pub fn for_sandbox(
    host: HostContext,
    developer_payload: Option<String>,
    store: StoreClient,
) -> CashierBuilder {
    let vendor = SandboxVendor::new(host.app_id(), developer_payload, store);
    Cashier::builder(host).vendor(vendor)
}

fn purchase_error(error: StoreError) -> VendorError {
    match error {
        StoreError::BillingUnavailable | StoreError::ItemUnavailable(_) => {
            VendorError::PurchaseUnavailable
        }
        StoreError::ItemAlreadyOwned(_) => VendorError::PurchaseAlreadyOwned,
        StoreError::ItemNotOwned(_) => VendorError::PurchaseNotOwned,
        StoreError::StoreClosed | StoreError::StoreDropped => VendorError::PurchaseFailure,
        other => VendorError::Backend {
            code: other.code(),
            message: other.to_string(),
        },
    }
}

fn consume_error(error: StoreError) -> VendorError {
    match error {
        StoreError::BillingUnavailable => VendorError::ConsumeUnavailable,
        StoreError::ItemNotOwned(_) => VendorError::ConsumeNotOwned,
        StoreError::StoreClosed | StoreError::StoreDropped => VendorError::ConsumeFailure,
        other => VendorError::Backend {
            code: other.code(),
            message: other.to_string(),
        },
    }
}
