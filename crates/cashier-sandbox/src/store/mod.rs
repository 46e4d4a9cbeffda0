//! # Sandbox Store
//!
//! A stand-in billing backend running as an actor, so the cashier can be exercised
//! end to end without a real platform store.
//!
//! - [`StoreActor`] - owns catalog, ownership and open purchase screens.
//! - [`StoreClient`] - cloneable request handle.
//! - [`StoreScreen`] - stream of [`LaunchedFlow`]s, one per purchase screen shown.

pub mod actor;
pub mod client;
pub mod config;
pub mod error;
pub mod message;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use config::StoreConfig;
pub use error::StoreError;
pub use message::{LaunchedFlow, Receipt, StoreRequest};

use tokio::sync::mpsc;

/// Receiving side of the store's purchase screen.
#[derive(Debug)]
pub struct StoreScreen {
    receiver: mpsc::UnboundedReceiver<LaunchedFlow>,
}

impl StoreScreen {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<LaunchedFlow>) -> Self {
        Self { receiver }
    }

    /// Waits for the next purchase screen. `None` once the store has shut down.
    pub async fn next_flow(&mut self) -> Option<LaunchedFlow> {
        self.receiver.recv().await
    }
}

/// Creates a store from `config`. Spawn the actor's `run()` before using the client.
pub fn new(config: StoreConfig) -> (StoreActor, StoreClient, StoreScreen) {
    StoreActor::new(config)
}
