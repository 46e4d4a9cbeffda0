//! # Sandbox Store Actor
//!
//! An in-memory billing backend. It owns the catalog, the purchases each app owns and
//! the purchase screens currently in front of the user, and processes requests one
//! at a time, so none of that state needs a lock.
//!
//! A buy intent does not finish the purchase. The store records the flow, announces
//! it on the [`StoreScreen`](super::StoreScreen) and waits for a `CompleteFlow`
//! request, which plays the part of the user approving or dismissing the screen. The
//! answer is a [`CompletionEvent`] the host then routes back to the cashier.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use cashier::{CompletionEvent, Product, ProductId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::client::StoreClient;
use super::config::StoreConfig;
use super::error::StoreError;
use super::message::{LaunchedFlow, Receipt, StoreRequest};
use super::StoreScreen;

struct PendingIntent {
    product_id: ProductId,
    developer_payload: Option<String>,
}

pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    screen: mpsc::UnboundedSender<LaunchedFlow>,
    online: bool,
    catalog: Vec<Product>,
    /// Owned purchases keyed by purchase token.
    owned: HashMap<String, Receipt>,
    /// Open purchase screens keyed by (app id, request code).
    flows: HashMap<(String, i32), PendingIntent>,
    next_order: u64,
}

impl StoreActor {
    /// Creates the store, the client used to talk to it and the screen on which it
    /// announces launched purchase flows.
    pub fn new(config: StoreConfig) -> (Self, StoreClient, StoreScreen) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let (screen_tx, screen_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            screen: screen_tx,
            online: config.online,
            catalog: config.catalog,
            owned: HashMap::new(),
            flows: HashMap::new(),
            next_order: 0,
        };
        (actor, StoreClient::new(sender), StoreScreen::new(screen_rx))
    }

    /// Runs the store until a `Shutdown` request arrives or every client has been
    /// dropped.
    pub async fn run(mut self) {
        info!(
            products = self.catalog.len(),
            online = self.online,
            "Store started"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Connect { app_id, respond_to } => {
                    let result = self.ensure_online();
                    debug!(%app_id, connected = result.is_ok(), "Connect");
                    let _ = respond_to.send(result);
                }
                StoreRequest::Catalog { respond_to } => {
                    let result = self.ensure_online().map(|_| self.catalog.clone());
                    let _ = respond_to.send(result);
                }
                StoreRequest::BuyIntent {
                    app_id,
                    request_code,
                    product_id,
                    developer_payload,
                    respond_to,
                } => {
                    let result =
                        self.buy_intent(app_id, request_code, product_id, developer_payload);
                    if let Err(e) = &result {
                        warn!(request_code, error = %e, "Buy intent rejected");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::CompleteFlow {
                    app_id,
                    request_code,
                    approve,
                    respond_to,
                } => {
                    let result = self.complete_flow(&app_id, request_code, approve);
                    if let Err(e) = &result {
                        warn!(request_code, error = %e, "Complete flow failed");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Consume {
                    app_id,
                    token,
                    respond_to,
                } => {
                    let result = self.consume(&app_id, &token);
                    match &result {
                        Ok(()) => info!(%token, owned = self.owned.len(), "Consumed"),
                        Err(e) => warn!(%token, error = %e, "Consume failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Owned { app_id, respond_to } => {
                    let receipts: Vec<Receipt> = self
                        .owned
                        .values()
                        .filter(|receipt| receipt.package_name == app_id)
                        .cloned()
                        .collect();
                    debug!(%app_id, count = receipts.len(), "Owned");
                    let _ = respond_to.send(Ok(receipts));
                }
                StoreRequest::SetOnline { online, respond_to } => {
                    self.online = online;
                    info!(online, "Store connectivity changed");
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::Shutdown { respond_to } => {
                    info!("Store shutdown requested");
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(owned = self.owned.len(), open_flows = self.flows.len(), "Store shutdown");
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online {
            Ok(())
        } else {
            Err(StoreError::BillingUnavailable)
        }
    }

    fn buy_intent(
        &mut self,
        app_id: String,
        request_code: i32,
        product_id: ProductId,
        developer_payload: Option<String>,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let product = self
            .catalog
            .iter()
            .find(|product| *product.id() == product_id)
            .ok_or_else(|| StoreError::ItemUnavailable(product_id.to_string()))?;

        let already_owned = self
            .owned
            .values()
            .any(|receipt| receipt.package_name == app_id && receipt.product_id == product_id);
        if already_owned {
            return Err(StoreError::ItemAlreadyOwned(product_id.to_string()));
        }

        let key = (app_id.clone(), request_code);
        if self.flows.contains_key(&key) {
            return Err(StoreError::FlowInProgress(request_code));
        }
        info!(request_code, %product_id, kind = ?product.kind(), "Purchase flow launched");

        self.flows.insert(
            key,
            PendingIntent {
                product_id: product_id.clone(),
                developer_payload,
            },
        );
        let flow = LaunchedFlow {
            app_id,
            request_code,
            product_id,
        };
        if self.screen.send(flow).is_err() {
            debug!(request_code, "Nobody is watching the store screen");
        }
        Ok(())
    }

    fn complete_flow(
        &mut self,
        app_id: &str,
        request_code: i32,
        approve: bool,
    ) -> Result<CompletionEvent, StoreError> {
        let intent = self
            .flows
            .remove(&(app_id.to_string(), request_code))
            .ok_or(StoreError::UnknownFlow(request_code))?;

        if !approve {
            info!(request_code, product_id = %intent.product_id, "Purchase flow dismissed");
            return Ok(CompletionEvent::canceled(request_code));
        }

        self.next_order += 1;
        let receipt = Receipt {
            order_id: format!("SBX.{:04}", self.next_order),
            package_name: app_id.to_string(),
            product_id: intent.product_id,
            purchase_token: format!("sbx-token-{}", self.next_order),
            purchase_time: now_millis(),
            developer_payload: intent.developer_payload,
        };
        let payload =
            serde_json::to_string(&receipt).map_err(|e| StoreError::Receipt(e.to_string()))?;

        info!(
            request_code,
            order_id = %receipt.order_id,
            product_id = %receipt.product_id,
            "Purchase approved"
        );
        self.owned.insert(receipt.purchase_token.clone(), receipt);
        Ok(CompletionEvent::ok(request_code, payload))
    }

    fn consume(&mut self, app_id: &str, token: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        match self.owned.get(token) {
            Some(receipt) if receipt.package_name == app_id => {
                self.owned.remove(token);
                Ok(())
            }
            _ => Err(StoreError::ItemNotOwned(token.to_string())),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashier::{ProductType, RESULT_CANCELED, RESULT_OK};

    const APP: &str = "com.example.game";

    fn coins() -> Product {
        Product::new("coin_100", ProductType::Consumable).unwrap()
    }

    fn spawn_store(config: StoreConfig) -> (StoreClient, StoreScreen) {
        let (actor, client, screen) = StoreActor::new(config);
        tokio::spawn(actor.run());
        (client, screen)
    }

    #[tokio::test]
    async fn approved_flow_issues_receipt_and_ownership() {
        let (client, mut screen) = spawn_store(StoreConfig::default().with_product(coins()));

        client
            .buy_intent(APP, 1001, coins().id().clone(), Some("dev".into()))
            .await
            .unwrap();
        let flow = screen.next_flow().await.unwrap();
        assert_eq!(flow.request_code, 1001);
        assert_eq!(flow.product_id, *coins().id());

        let event = client.complete_flow(APP, 1001, true).await.unwrap();
        assert_eq!(event.result_code, RESULT_OK);
        let receipt: Receipt = serde_json::from_str(event.payload.as_deref().unwrap()).unwrap();
        assert_eq!(receipt.package_name, APP);
        assert_eq!(receipt.developer_payload.as_deref(), Some("dev"));

        let owned = client.owned(APP).await.unwrap();
        assert_eq!(owned, vec![receipt]);
    }

    #[tokio::test]
    async fn dismissed_flow_is_canceled_and_closed() {
        let (client, _screen) = spawn_store(StoreConfig::default().with_product(coins()));

        client
            .buy_intent(APP, 1001, coins().id().clone(), None)
            .await
            .unwrap();
        let event = client.complete_flow(APP, 1001, false).await.unwrap();
        assert_eq!(event.result_code, RESULT_CANCELED);
        assert!(event.payload.is_none());

        let again = client.complete_flow(APP, 1001, true).await;
        assert_eq!(again, Err(StoreError::UnknownFlow(1001)));
        assert!(client.owned(APP).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owned_item_cannot_be_bought_twice_until_consumed() {
        let (client, _screen) = spawn_store(StoreConfig::default().with_product(coins()));

        client
            .buy_intent(APP, 1001, coins().id().clone(), None)
            .await
            .unwrap();
        client.complete_flow(APP, 1001, true).await.unwrap();

        let second = client.buy_intent(APP, 1002, coins().id().clone(), None).await;
        assert_eq!(
            second,
            Err(StoreError::ItemAlreadyOwned("coin_100".to_string()))
        );

        let token = client.owned(APP).await.unwrap()[0].purchase_token.clone();
        client.consume(APP, &token).await.unwrap();
        assert_eq!(
            client.consume(APP, &token).await,
            Err(StoreError::ItemNotOwned(token))
        );
        client
            .buy_intent(APP, 1003, coins().id().clone(), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_product_is_unavailable() {
        let (client, _screen) = spawn_store(StoreConfig::default());
        let result = client
            .buy_intent(APP, 1001, coins().id().clone(), None)
            .await;
        assert_eq!(result, Err(StoreError::ItemUnavailable("coin_100".into())));
    }

    #[tokio::test]
    async fn offline_store_refuses_connections() {
        let (client, _screen) = spawn_store(StoreConfig::default().offline());
        assert_eq!(client.connect(APP).await, Err(StoreError::BillingUnavailable));

        client.set_online(true).await.unwrap();
        assert_eq!(client.connect(APP).await, Ok(()));
    }

    #[tokio::test]
    async fn shutdown_request_stops_store_while_clients_remain() {
        let (actor, client, _screen) = StoreActor::new(StoreConfig::default());
        let handle = tokio::spawn(actor.run());
        let other = client.clone();

        client.shutdown().await.unwrap();
        handle.await.unwrap();

        assert!(other.is_closed());
        assert_eq!(other.connect(APP).await, Err(StoreError::StoreClosed));
    }

    #[tokio::test]
    async fn flows_are_scoped_per_app() {
        let (client, _screen) = spawn_store(StoreConfig::default().with_product(coins()));

        client
            .buy_intent(APP, 1001, coins().id().clone(), None)
            .await
            .unwrap();
        let foreign = client.complete_flow("com.other.app", 1001, true).await;
        assert_eq!(foreign, Err(StoreError::UnknownFlow(1001)));
    }
}
