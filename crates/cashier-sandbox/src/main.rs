use cashier::telemetry::setup_tracing;
use cashier::{CashierConfig, HostContext, Product, ProductType, PurchaseOutcome};
use cashier_sandbox::{Storefront, StoreConfig, StorefrontError};
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), StorefrontError> {
    setup_tracing();

    let coins = Product::new("coin_100", ProductType::Consumable)?.with_price("$0.99");
    let no_ads = Product::new("remove_ads", ProductType::NonConsumable)?.with_price("$2.99");
    let store_config = StoreConfig::default()
        .with_product(coins.clone())
        .with_product(no_ads.clone());

    let host = HostContext::new("com.example.game")?;
    let mut storefront = Storefront::new(
        host,
        store_config,
        CashierConfig::default(),
        Some("player-42".to_string()),
    )?;

    // Buy coins; the purchase stays open until the screen is answered.
    let buyer = storefront.cashier.clone();
    let pending = tokio::spawn(
        async move { buyer.purchase_outcome(coins).await }
            .instrument(tracing::info_span!("buy_coins")),
    );
    storefront.finish_next_flow(true).await?;

    let purchase = match pending
        .await
        .map_err(|e| StorefrontError::TaskFailed(e.to_string()))??
    {
        PurchaseOutcome::Success(purchase) => purchase,
        PurchaseOutcome::Failure { error, .. } => {
            warn!(%error, "Coin purchase failed");
            return storefront.shutdown().await;
        }
    };
    info!(order_id = purchase.order_id(), "Coins bought");

    let consumed = storefront.cashier.consume_outcome(purchase).await?;
    info!(consumed = consumed.is_success(), "Coins granted");

    // Dismiss the screen for the ad remover.
    let buyer = storefront.cashier.clone();
    let pending = tokio::spawn(async move { buyer.purchase_outcome(no_ads).await });
    storefront.finish_next_flow(false).await?;
    if let Ok(Ok(PurchaseOutcome::Failure { error, .. })) = pending.await {
        info!(%error, "Ad remover not bought");
    }

    storefront.shutdown().await?;
    info!("Sandbox demo completed");
    Ok(())
}
