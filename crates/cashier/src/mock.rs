//! # Mock Vendor & Testing Guide
//!
//! [`MockVendor`] implements [`Vendor`] entirely in memory. Queue up what each vendor
//! call should do, hand a clone to the cashier, drive the flow, then assert on the
//! recorded calls and on what the listener saw.
//!
//! ## When to use the mock vs the sandbox vendor
//!
//! | Feature | MockVendor | SandboxVendor |
//! |---------|------------|---------------|
//! | **Speed** | Instant | Fast (spawns a store actor) |
//! | **Determinism** | 100% scripted | Subject to the scheduler |
//! | **Use Case** | Orchestration rules of the cashier | End-to-end flows against a backend |
//! | **Error Injection** | Easy (`return_err`) | Requires specific store state |
//!
//! ## Example
//!
//! ```rust
//! use cashier::mock::{ListenerEvent, MockVendor, RecordingListener, VendorCall};
//! use cashier::{Cashier, CompletionEvent, HostContext, Product, ProductType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockVendor::new();
//!     mock.expect_initialize().return_ok();
//!     mock.expect_purchase().await_completion(1001);
//!
//!     let cashier = Cashier::builder(HostContext::new("com.example.game").unwrap())
//!         .vendor(mock.clone())
//!         .build()
//!         .unwrap();
//!
//!     let coins = Product::new("coin_100", ProductType::Consumable).unwrap();
//!     let listener = RecordingListener::new();
//!     cashier.purchase(coins, listener.clone()).await.unwrap();
//!     assert!(listener.events().is_empty());
//!
//!     assert!(cashier.route_completion_event(&CompletionEvent::ok(1001, "{}")));
//!     assert!(matches!(listener.events().as_slice(), [ListenerEvent::PurchaseSucceeded(_)]));
//!     assert!(mock.calls().contains(&VendorCall::RouteCompletion(1001)));
//!     mock.verify();
//! }
//! ```
//!
//! Unexpected vendor calls panic with "Unexpected ... or expectation mismatch", which
//! is how a test asserts that the cashier never reached the vendor.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::completion::CompletionEvent;
use crate::error::VendorError;
use crate::listener::{ConsumeListener, PurchaseListener};
use crate::logging::Logger;
use crate::model::{HostContext, Product, ProductId, Purchase};
use crate::vendor::Vendor;

// =============================================================================
// EXPECTATIONS
// =============================================================================

enum InitializeResponse {
    Ok,
    Err(VendorError),
    Never,
}

enum PurchaseResponse {
    Ok(Purchase),
    Err(VendorError),
    AwaitCompletion(i32),
}

/// Scripted behavior for the next vendor call, consumed in FIFO order.
enum Expectation {
    Initialize(InitializeResponse),
    Purchase(PurchaseResponse),
    Consume(Result<(), VendorError>),
}

/// A vendor call recorded by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorCall {
    Initialize,
    CanPurchase(ProductId),
    Purchase(ProductId),
    Consume(String),
    RouteCompletion(i32),
    Dispose,
}

struct PendingFlow {
    product: Product,
    listener: Box<dyn PurchaseListener>,
}

struct MockState {
    expectations: VecDeque<Expectation>,
    calls: Vec<VendorCall>,
    available: bool,
    can_purchase: bool,
    pending: HashMap<i32, PendingFlow>,
    logger: Option<Arc<dyn Logger>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            expectations: VecDeque::new(),
            calls: Vec::new(),
            available: true,
            can_purchase: true,
            pending: HashMap::new(),
            logger: None,
        }
    }
}

// =============================================================================
// MOCK VENDOR
// =============================================================================

/// Scriptable in-memory vendor.
///
/// Clones share state, so keep one handle for assertions and give another to the
/// cashier. `available()` and `can_purchase()` default to `true`.
#[derive(Clone, Default)]
pub struct MockVendor {
    state: Arc<Mutex<MockState>>,
}

impl MockVendor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_initialize(&mut self) -> InitializeExpectationBuilder {
        InitializeExpectationBuilder {
            state: self.state.clone(),
        }
    }

    pub fn expect_purchase(&mut self) -> PurchaseExpectationBuilder {
        PurchaseExpectationBuilder {
            state: self.state.clone(),
        }
    }

    pub fn expect_consume(&mut self) -> ConsumeExpectationBuilder {
        ConsumeExpectationBuilder {
            state: self.state.clone(),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    pub fn set_can_purchase(&self, can_purchase: bool) {
        self.state.lock().unwrap().can_purchase = can_purchase;
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<VendorCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn purchase_calls(&self) -> usize {
        self.count(|call| matches!(call, VendorCall::Purchase(_)))
    }

    pub fn consume_calls(&self) -> usize {
        self.count(|call| matches!(call, VendorCall::Consume(_)))
    }

    /// Purchase flows parked until a completion event arrives.
    pub fn pending_flows(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn has_logger(&self) -> bool {
        self.state.lock().unwrap().logger.is_some()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    fn count(&self, predicate: impl Fn(&VendorCall) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: VendorCall) -> Option<Expectation> {
        let mut state = self.state.lock().unwrap();
        if let Some(logger) = &state.logger {
            logger.debug(&format!("mock vendor call: {call:?}"));
        }
        state.calls.push(call);
        state.expectations.pop_front()
    }
}

#[async_trait]
impl Vendor for MockVendor {
    fn id(&self) -> &str {
        "mock"
    }

    async fn initialize(&self, _host: &HostContext) -> Result<(), VendorError> {
        let response = match self.record(VendorCall::Initialize) {
            Some(Expectation::Initialize(response)) => response,
            _ => panic!("Unexpected initialize or expectation mismatch"),
        };

        match response {
            InitializeResponse::Ok => Ok(()),
            InitializeResponse::Err(error) => {
                self.set_available(false);
                Err(error)
            }
            InitializeResponse::Never => std::future::pending().await,
        }
    }

    fn available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    fn can_purchase(&self, product: &Product) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VendorCall::CanPurchase(product.id().clone()));
        state.can_purchase
    }

    async fn purchase(
        &self,
        _host: &HostContext,
        product: Product,
        listener: Box<dyn PurchaseListener>,
    ) {
        let response = match self.record(VendorCall::Purchase(product.id().clone())) {
            Some(Expectation::Purchase(response)) => response,
            _ => panic!("Unexpected purchase or expectation mismatch"),
        };

        match response {
            PurchaseResponse::Ok(purchase) => listener.success(purchase),
            PurchaseResponse::Err(error) => listener.failure(product, error),
            PurchaseResponse::AwaitCompletion(request_code) => {
                self.state
                    .lock()
                    .unwrap()
                    .pending
                    .insert(request_code, PendingFlow { product, listener });
            }
        }
    }

    async fn consume(&self, _host: &HostContext, purchase: Purchase, listener: Box<dyn ConsumeListener>) {
        let response = match self.record(VendorCall::Consume(purchase.order_id().to_string())) {
            Some(Expectation::Consume(response)) => response,
            _ => panic!("Unexpected consume or expectation mismatch"),
        };

        match response {
            Ok(()) => listener.success(purchase),
            Err(error) => listener.failure(purchase, error),
        }
    }

    fn route_completion(&self, event: &CompletionEvent) -> bool {
        let flow = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(VendorCall::RouteCompletion(event.request_code));
            state.pending.remove(&event.request_code)
        };
        let Some(PendingFlow { product, listener }) = flow else {
            return false;
        };

        if event.is_ok() {
            let purchase = Purchase::new(
                product,
                format!("mock-order-{}", event.request_code),
                format!("mock-token-{}", event.request_code),
                event.payload.clone().unwrap_or_default(),
            );
            listener.success(purchase);
        } else {
            listener.failure(product, VendorError::PurchaseCanceled);
        }
        true
    }

    async fn dispose(&self, _host: &HostContext) {
        let flows: Vec<PendingFlow> = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(VendorCall::Dispose);
            state.available = false;
            state.pending.drain().map(|(_, flow)| flow).collect()
        };
        for flow in flows {
            flow.listener.failure(flow.product, VendorError::Disposed);
        }
    }

    fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.state.lock().unwrap().logger = Some(logger);
    }
}

// =============================================================================
// EXPECTATION BUILDERS
// =============================================================================

/// Builder for `initialize` expectations.
pub struct InitializeExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl InitializeExpectationBuilder {
    pub fn return_ok(self) {
        self.push(InitializeResponse::Ok);
    }

    /// Fails the handshake; `available()` turns false.
    pub fn return_err(self, error: VendorError) {
        self.push(InitializeResponse::Err(error));
    }

    /// The handshake never resolves.
    pub fn never_complete(self) {
        self.push(InitializeResponse::Never);
    }

    fn push(self, response: InitializeResponse) {
        let mut state = self.state.lock().unwrap();
        state
            .expectations
            .push_back(Expectation::Initialize(response));
    }
}

/// Builder for `purchase` expectations.
pub struct PurchaseExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl PurchaseExpectationBuilder {
    /// Completes the flow immediately with `purchase`.
    pub fn return_ok(self, purchase: Purchase) {
        self.push(PurchaseResponse::Ok(purchase));
    }

    /// Fails the flow immediately with `error`.
    pub fn return_err(self, error: VendorError) {
        self.push(PurchaseResponse::Err(error));
    }

    /// Parks the flow until a completion event with `request_code` is routed.
    pub fn await_completion(self, request_code: i32) {
        self.push(PurchaseResponse::AwaitCompletion(request_code));
    }

    fn push(self, response: PurchaseResponse) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation::Purchase(response));
    }
}

/// Builder for `consume` expectations.
pub struct ConsumeExpectationBuilder {
    state: Arc<Mutex<MockState>>,
}

impl ConsumeExpectationBuilder {
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    pub fn return_err(self, error: VendorError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), VendorError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation::Consume(response));
    }
}

// =============================================================================
// RECORDING LISTENER
// =============================================================================

/// What a [`RecordingListener`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerEvent {
    PurchaseSucceeded(Purchase),
    PurchaseFailed(Product, VendorError),
    ConsumeSucceeded(Purchase),
    ConsumeFailed(Purchase, VendorError),
}

/// Listener that records every callback. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<ListenerEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: ListenerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PurchaseListener for RecordingListener {
    fn success(&self, purchase: Purchase) {
        self.push(ListenerEvent::PurchaseSucceeded(purchase));
    }

    fn failure(&self, product: Product, error: VendorError) {
        self.push(ListenerEvent::PurchaseFailed(product, error));
    }
}

impl ConsumeListener for RecordingListener {
    fn success(&self, purchase: Purchase) {
        self.push(ListenerEvent::ConsumeSucceeded(purchase));
    }

    fn failure(&self, purchase: Purchase, error: VendorError) {
        self.push(ListenerEvent::ConsumeFailed(purchase, error));
    }
}
