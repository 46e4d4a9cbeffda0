//! # Storefront Lifecycle
//!
//! [`Storefront`] wires a complete sandbox: the store actor, a [`Cashier`] backed by
//! a [`SandboxVendor`](crate::vendor::SandboxVendor), and a [`CompletionRouter`] that
//! carries completion events from the store back to the cashier.
//!
//! ```text
//!  host ──purchase──▶ Cashier ──buy intent──▶ StoreActor ──LaunchedFlow──▶ StoreScreen
//!                        ▲                                                    │
//!                        └──── CompletionRouter ◀── finish_flow(approve) ─────┘
//! ```
//!
//! ## Shutdown
//!
//! 1. Dispose the cashier, failing any flow still waiting on the screen.
//! 2. Send the store an explicit `Shutdown`. The vendor inside the cashier holds a
//!    store client, so waiting for the last client to drop would hang while any
//!    `Arc<Cashier>` clone is alive.
//! 3. Drop the completion client. The router exits once every clone of it is gone.
//! 4. Await the router, then the store.

use std::sync::Arc;

use cashier::{
    Cashier, CashierConfig, CashierError, CompletionClient, CompletionHandler, CompletionRouter,
    HostContext, TracingLogger,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::store::{self, LaunchedFlow, StoreClient, StoreConfig, StoreError, StoreScreen};
use crate::vendor::for_sandbox;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Cashier(#[from] CashierError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Store screen closed")]
    ScreenClosed,
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

pub struct Storefront {
    pub cashier: Arc<Cashier>,
    pub store_client: StoreClient,
    /// Clones must be dropped before [`shutdown`](Self::shutdown) can finish.
    pub completions: CompletionClient,
    screen: StoreScreen,
    app_id: String,
    handles: Vec<JoinHandle<()>>,
}

impl Storefront {
    /// Builds and starts the sandbox. Must be called inside a Tokio runtime.
    pub fn new(
        host: HostContext,
        store_config: StoreConfig,
        cashier_config: CashierConfig,
        developer_payload: Option<String>,
    ) -> Result<Self, StorefrontError> {
        let app_id = host.app_id().to_string();
        let router_buffer = cashier_config.router_buffer;
        let (store_actor, store_client, screen) = store::new(store_config);

        let cashier = for_sandbox(host, developer_payload, store_client.clone())
            .config(cashier_config)
            .logger(Arc::new(TracingLogger::new("sandbox")))
            .build()?;
        let cashier = Arc::new(cashier);

        let (router, completions) = CompletionRouter::new(
            router_buffer,
            vec![cashier.clone() as Arc<dyn CompletionHandler>],
        );

        let store_handle = tokio::spawn(store_actor.run());
        let router_handle = tokio::spawn(router.run());
        info!(%app_id, "Storefront started");

        Ok(Self {
            cashier,
            store_client,
            completions,
            screen,
            app_id,
            handles: vec![router_handle, store_handle],
        })
    }

    /// Waits for the next purchase screen the store shows.
    pub async fn next_flow(&mut self) -> Option<LaunchedFlow> {
        self.screen.next_flow().await
    }

    /// Plays the user's answer to the screen for `request_code` and routes the
    /// resulting completion event. Returns whether a handler consumed it.
    pub async fn finish_flow(
        &self,
        request_code: i32,
        approve: bool,
    ) -> Result<bool, StorefrontError> {
        let event = self
            .store_client
            .complete_flow(&self.app_id, request_code, approve)
            .await?;
        Ok(self.completions.route(event).await?)
    }

    /// [`next_flow`](Self::next_flow) followed by [`finish_flow`](Self::finish_flow).
    pub async fn finish_next_flow(&mut self, approve: bool) -> Result<bool, StorefrontError> {
        let flow = self
            .next_flow()
            .await
            .ok_or(StorefrontError::ScreenClosed)?;
        self.finish_flow(flow.request_code, approve).await
    }

    pub async fn shutdown(self) -> Result<(), StorefrontError> {
        info!("Shutting down storefront...");
        self.cashier.dispose().await;
        if let Err(e) = self.store_client.shutdown().await {
            warn!(error = %e, "Store already stopped");
        }

        drop(self.completions);
        drop(self.cashier);
        drop(self.store_client);
        drop(self.screen);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Storefront task failed");
                return Err(StorefrontError::TaskFailed(e.to_string()));
            }
        }

        info!("Storefront shutdown complete");
        Ok(())
    }
}
