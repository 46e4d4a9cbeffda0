use cashier::{
    CashierConfig, CashierError, ConsumeOutcome, HostContext, Product, ProductType,
    PurchaseOutcome, VendorError,
};
use cashier_sandbox::store::Receipt;
use cashier_sandbox::{StoreConfig, Storefront, StorefrontError};
use std::time::Duration;
use tokio::task::JoinHandle;

const APP: &str = "com.example.game";

fn coins() -> Product {
    Product::new("coin_100", ProductType::Consumable)
        .unwrap()
        .with_price("$0.99")
}

fn no_ads() -> Product {
    Product::new("remove_ads", ProductType::NonConsumable).unwrap()
}

fn storefront(store_config: StoreConfig) -> Storefront {
    Storefront::new(
        HostContext::new(APP).unwrap(),
        store_config,
        CashierConfig::default(),
        Some("player-42".to_string()),
    )
    .expect("Failed to start storefront")
}

fn catalog() -> StoreConfig {
    StoreConfig::default()
        .with_product(coins())
        .with_product(no_ads())
}

fn start_purchase(
    storefront: &Storefront,
    product: Product,
) -> JoinHandle<Result<PurchaseOutcome, CashierError>> {
    let cashier = storefront.cashier.clone();
    tokio::spawn(async move { cashier.purchase_outcome(product).await })
}

#[tokio::test]
async fn approved_purchase_then_consume() {
    let mut storefront = storefront(catalog());

    let pending = start_purchase(&storefront, coins());
    assert!(storefront.finish_next_flow(true).await.unwrap());

    let purchase = match pending.await.unwrap().unwrap() {
        PurchaseOutcome::Success(purchase) => purchase,
        other => panic!("Expected success, got {:?}", other),
    };
    assert_eq!(purchase.product(), &coins());
    assert_eq!(purchase.developer_payload(), Some("player-42"));
    let receipt: Receipt = serde_json::from_str(purchase.receipt()).unwrap();
    assert_eq!(receipt.order_id, purchase.order_id());
    assert_eq!(receipt.purchase_token, purchase.token());

    let owned = storefront.store_client.owned(APP).await.unwrap();
    assert_eq!(owned.len(), 1);

    let consumed = storefront
        .cashier
        .consume_outcome(purchase.clone())
        .await
        .unwrap();
    assert_eq!(consumed, ConsumeOutcome::Success(purchase.clone()));
    assert!(storefront.store_client.owned(APP).await.unwrap().is_empty());

    // The token is spent now.
    let again = storefront.cashier.consume_outcome(purchase.clone()).await.unwrap();
    assert_eq!(
        again,
        ConsumeOutcome::Failure {
            purchase,
            error: VendorError::ConsumeNotOwned
        }
    );

    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn dismissed_screen_cancels_purchase() {
    let mut storefront = storefront(catalog());

    let pending = start_purchase(&storefront, coins());
    assert!(storefront.finish_next_flow(false).await.unwrap());

    assert_eq!(
        pending.await.unwrap().unwrap(),
        PurchaseOutcome::Failure {
            product: coins(),
            error: VendorError::PurchaseCanceled
        }
    );
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn non_consumable_cannot_be_bought_twice() {
    let mut storefront = storefront(catalog());

    let first = start_purchase(&storefront, no_ads());
    storefront.finish_next_flow(true).await.unwrap();
    assert!(first.await.unwrap().unwrap().is_success());

    let second = storefront.cashier.purchase_outcome(no_ads()).await.unwrap();
    assert_eq!(
        second,
        PurchaseOutcome::Failure {
            product: no_ads(),
            error: VendorError::PurchaseAlreadyOwned
        }
    );
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn product_missing_from_catalog_is_unavailable() {
    let storefront = storefront(StoreConfig::default().with_product(coins()));

    let outcome = storefront.cashier.purchase_outcome(no_ads()).await.unwrap();

    assert_eq!(
        outcome,
        PurchaseOutcome::Failure {
            product: no_ads(),
            error: VendorError::PurchaseUnavailable
        }
    );
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn offline_store_makes_purchases_unavailable() {
    let mut storefront = storefront(catalog().offline());

    let outcome = storefront.cashier.purchase_outcome(coins()).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::Failure {
            product: coins(),
            error: VendorError::PurchaseUnavailable
        }
    );

    // Initialization is retried once the store comes back.
    storefront.store_client.set_online(true).await.unwrap();
    let pending = start_purchase(&storefront, coins());
    assert!(storefront.finish_next_flow(true).await.unwrap());
    assert!(pending.await.unwrap().unwrap().is_success());

    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn store_going_offline_mid_session_fails_the_flow() {
    let mut storefront = storefront(catalog());

    let first = start_purchase(&storefront, coins());
    storefront.finish_next_flow(false).await.unwrap();
    first.await.unwrap().unwrap();

    storefront.store_client.set_online(false).await.unwrap();
    let outcome = storefront.cashier.purchase_outcome(coins()).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::Failure {
            product: coins(),
            error: VendorError::PurchaseUnavailable
        }
    );
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_completion_is_not_consumed() {
    let mut storefront = storefront(catalog());

    let pending = start_purchase(&storefront, coins());
    let flow = storefront.next_flow().await.unwrap();

    let stray = cashier::CompletionEvent::canceled(flow.request_code + 100);
    assert!(!storefront.completions.route(stray).await.unwrap());

    assert!(storefront.finish_flow(flow.request_code, true).await.unwrap());
    assert!(pending.await.unwrap().unwrap().is_success());
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_fails_open_flows() {
    let mut storefront = storefront(catalog());

    let pending = start_purchase(&storefront, coins());
    storefront.next_flow().await.unwrap();

    storefront.shutdown().await.unwrap();

    assert_eq!(
        pending.await.unwrap().unwrap(),
        PurchaseOutcome::Failure {
            product: coins(),
            error: VendorError::Disposed
        }
    );
}

#[tokio::test]
async fn disposed_cashier_rejects_new_purchases() {
    let storefront = storefront(catalog());

    storefront.cashier.dispose().await;
    let result = storefront.cashier.purchase_outcome(coins()).await;

    assert!(matches!(result, Err(CashierError::Disposed)));
    storefront.shutdown().await.unwrap();
}

#[tokio::test]
async fn zero_router_buffer_is_rejected_at_startup() {
    let config = CashierConfig {
        router_buffer: 0,
        ..CashierConfig::default()
    };

    let result = Storefront::new(HostContext::new(APP).unwrap(), catalog(), config, None);

    assert!(matches!(
        result,
        Err(StorefrontError::Cashier(CashierError::InvalidArgument(_)))
    ));
}

#[tokio::test]
async fn shutdown_completes_while_cashier_handles_remain() {
    let storefront = storefront(catalog());
    let kept = storefront.cashier.clone();

    tokio::time::timeout(Duration::from_secs(5), storefront.shutdown())
        .await
        .expect("Shutdown hung on an outstanding cashier handle")
        .unwrap();

    assert!(kept.is_disposed());
    let result = kept.purchase_outcome(coins()).await;
    assert!(matches!(result, Err(CashierError::Disposed)));
}
