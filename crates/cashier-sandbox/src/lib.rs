//! # Cashier Sandbox
//!
//! A simulated billing backend for the [`cashier`] facade.
//!
//! ## 🚀 Core Components
//!
//! - **[store]**: the in-memory store actor, its client and its purchase screen.
//! - **[vendor]**: [`SandboxVendor`](vendor::SandboxVendor), the [`cashier::Vendor`]
//!   that talks to the store, and the [`for_sandbox`](vendor::for_sandbox) factory.
//! - **[lifecycle]**: [`Storefront`](lifecycle::Storefront), which starts and stops
//!   the whole thing.
//!
//! ## 🧪 Testing
//!
//! `Storefront::finish_next_flow` stands in for the user tapping through the store's
//! purchase screen, so complete purchase flows can run inside a `#[tokio::test]`.

pub mod lifecycle;
pub mod store;
pub mod vendor;

pub use lifecycle::{Storefront, StorefrontError};
pub use store::{StoreClient, StoreConfig, StoreError};
pub use vendor::{for_sandbox, SandboxVendor};
