//! # Observability & Tracing
//!
//! The cashier logs through `tracing` with structured fields instead of formatted
//! strings, so a purchase can be followed across the facade, the vendor and the
//! completion router:
//!
//! - `vendor` - the vendor id (e.g. `sandbox`)
//! - `product` - the product id of the flow
//! - `request_code` / `result_code` - the completion event being routed
//!
//! Facade methods open a span per call (`purchase`, `consume`), and every event
//! emitted while the vendor works inherits it.
//!
//! ```bash
//! # Flow milestones only
//! RUST_LOG=info cargo run -p cashier-sandbox
//!
//! # Include initialization and routing details
//! RUST_LOG=debug cargo run -p cashier-sandbox
//!
//! # Only the orchestration layer
//! RUST_LOG=cashier=debug cargo run -p cashier-sandbox
//! ```
//!
//! With `RUST_LOG=info` a successful purchase reads:
//!
//! ```text
//! INFO Cashier built vendor="sandbox" app_id="com.example.game"
//! INFO purchase{vendor="sandbox" product=coin_100}: Waiting for purchase completion request_code=1001 product_id=coin_100
//! INFO Completion consumed request_code=1001 handler=0
//! ```

/// Installs a compact `tracing-subscriber` formatter driven by `RUST_LOG`.
///
/// Call once, from the binary's `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
