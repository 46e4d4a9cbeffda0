//! Immutable value objects shared by the host, the cashier and vendors.

pub mod host;
pub mod product;
pub mod purchase;

pub use host::*;
pub use product::*;
pub use purchase::*;
