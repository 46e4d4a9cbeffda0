use serde::{Deserialize, Serialize};

use crate::error::CashierError;
use crate::model::{Product, ProductId};

/// A completed transaction, created by a vendor when a purchase flow succeeds.
///
/// The `receipt` is opaque vendor data (typically the raw signed payload the backend
/// returned). The cashier never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    order_id: String,
    product: Product,
    token: String,
    receipt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    developer_payload: Option<String>,
}

impl Purchase {
    /// Creates a new Purchase for `product`.
    ///
    /// Whether it is a subscription follows the product type.
    pub fn new(
        product: Product,
        order_id: impl Into<String>,
        token: impl Into<String>,
        receipt: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            product,
            token: token.into(),
            receipt: receipt.into(),
            developer_payload: None,
        }
    }

    pub fn with_developer_payload(mut self, payload: Option<String>) -> Self {
        self.developer_payload = payload;
        self
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &ProductId {
        self.product.id()
    }

    pub fn is_subscription(&self) -> bool {
        self.product.is_subscription()
    }

    /// Backend token used to address this purchase (e.g. when consuming it).
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn receipt(&self) -> &str {
        &self.receipt
    }

    pub fn developer_payload(&self) -> Option<&str> {
        self.developer_payload.as_deref()
    }

    pub fn to_json(&self) -> Result<String, CashierError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CashierError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductType;

    #[test]
    fn subscription_flag_follows_product_type() {
        let monthly = Product::new("monthly", ProductType::Subscription).unwrap();
        let coins = Product::new("coin_100", ProductType::Consumable).unwrap();

        assert!(Purchase::new(monthly, "o1", "t1", "{}").is_subscription());
        assert!(!Purchase::new(coins, "o2", "t2", "{}").is_subscription());
    }

    #[test]
    fn restores_from_json() {
        let product = Product::new("premium", ProductType::NonConsumable).unwrap();
        let purchase = Purchase::new(product, "order-1", "token-1", r#"{"raw":true}"#)
            .with_developer_payload(Some("attribution".into()));

        let restored = Purchase::from_json(&purchase.to_json().unwrap()).unwrap();
        assert_eq!(restored, purchase);
        assert_eq!(restored.product_id().as_str(), "premium");
        assert_eq!(restored.developer_payload(), Some("attribution"));
    }

    #[test]
    fn subscription_flag_in_json_cannot_contradict_product() {
        let json = r#"{
            "order_id": "order-9",
            "product": { "id": "monthly", "kind": "subscription" },
            "is_subscription": false,
            "token": "token-9",
            "receipt": "{}"
        }"#;

        let purchase = Purchase::from_json(json).unwrap();
        assert!(purchase.is_subscription());
        assert!(!purchase.to_json().unwrap().contains("is_subscription"));
    }
}
