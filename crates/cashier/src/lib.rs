//! # Cashier
//!
//! > **Vendor-agnostic purchase orchestration.**
//!
//! A host application asks for a product to be bought or consumed; the cashier makes
//! sure the billing backend behind it is ready, checks that the product can be sold,
//! and hands the flow to that backend. The host never learns which backend it is.
//!
//! ## 🏗️ Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Value layer** ([`model`]) - [`Product`], [`Purchase`] and [`HostContext`],
//!    immutable and validated at construction.
//! 2. **Vendor layer** ([`Vendor`]) - one trait per billing backend capability set:
//!    initialize, availability, purchase, consume, completion routing, dispose.
//! 3. **Facade layer** ([`Cashier`]) - sequences the initialization handshake and
//!    the precondition checks before delegating to the vendor.
//!
//! Outcomes flow back through [`PurchaseListener`] / [`ConsumeListener`], or through
//! the awaitable [`Cashier::purchase_outcome`] / [`Cashier::consume_outcome`].
//!
//! ## Error Model
//!
//! - **Contract violations** (consuming a subscription, building without a vendor,
//!   using a disposed cashier) return [`CashierError`] synchronously.
//! - **Business failures** (unavailable product, user canceled, already owned) are
//!   delivered as [`VendorError`] to the listener, exactly once.
//!
//! ## Out-of-process Flows
//!
//! When a vendor's purchase finishes outside the process, the host forwards the
//! platform's result as a [`CompletionEvent`], either directly with
//! [`Cashier::route_completion_event`] or through a [`CompletionRouter`] actor. See
//! the [`completion`] module.
//!
//! ## 🚀 Quick Start
//!
//! ```rust,ignore
//! let cashier = Cashier::builder(HostContext::new("com.example.game")?)
//!     .vendor(vendor)
//!     .logger(Arc::new(TracingLogger::default()))
//!     .build()?;
//!
//! let coins = Product::new("coin_100", ProductType::Consumable)?;
//! match cashier.purchase_outcome(coins).await? {
//!     PurchaseOutcome::Success(purchase) => grant(purchase),
//!     PurchaseOutcome::Failure { error, .. } => warn!(%error, "purchase failed"),
//! }
//! ```
//!
//! ## 🧪 Testing
//!
//! The [`mock`] module provides [`MockVendor`](mock::MockVendor), a scriptable
//! vendor with an expectation-builder API, and a recording listener.

pub mod builder;
pub mod cashier;
pub mod completion;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod mock;
pub mod model;
pub mod telemetry;
pub mod vendor;

// Re-export core types for convenience
pub use builder::CashierBuilder;
pub use cashier::Cashier;
pub use completion::{
    CompletionClient, CompletionEvent, CompletionHandler, CompletionRouter, RESULT_CANCELED,
    RESULT_OK,
};
pub use config::CashierConfig;
pub use error::{CashierError, VendorError, BACKEND_CODE_BASE};
pub use listener::{
    ConsumeListener, ConsumeOutcome, ConsumeResponder, PurchaseListener, PurchaseOutcome,
    PurchaseResponder,
};
pub use logging::{Logger, TracingLogger};
pub use model::{HostContext, Product, ProductId, ProductType, Purchase};
pub use vendor::Vendor;
