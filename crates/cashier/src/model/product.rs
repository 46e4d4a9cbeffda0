//! A purchasable item as the host application knows it.
//!
//! Products are immutable once built. The identifier is validated at construction,
//! so a `Product` in hand always carries a usable id.

use serde::{Deserialize, Serialize};

use std::fmt::Display;

use crate::error::CashierError;

/// Vendor-namespace-unique product identifier (the "SKU").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Result<Self, CashierError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CashierError::InvalidArgument(
                "product id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProductId {
    type Error = CashierError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a product behaves after it has been bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Can be bought again once the previous purchase was consumed.
    Consumable,
    /// Owned forever once bought.
    NonConsumable,
    /// Recurring entitlement, never consumable.
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    kind: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Product {
    /// Creates a new Product.
    ///
    /// # Arguments
    /// * `id` - Identifier as registered with the billing backend
    /// * `kind` - Consumable, non-consumable or subscription
    ///
    /// # Errors
    /// [`CashierError::InvalidArgument`] when `id` is empty.
    pub fn new(id: impl Into<String>, kind: ProductType) -> Result<Self, CashierError> {
        Ok(Self {
            id: ProductId::new(id)?,
            kind,
            price: None,
            title: None,
        })
    }

    /// Attaches the vendor-supplied display price.
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn kind(&self) -> ProductType {
        self.kind
    }

    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn is_subscription(&self) -> bool {
        self.kind == ProductType::Subscription
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

    #[test]
    fn rejects_blank_identifiers() {
        assert!(matches!(
            Product::new("", ProductType::Consumable),
            Err(CashierError::InvalidArgument(_))
        ));
        assert!(matches!(
            Product::new("   ", ProductType::Consumable),
            Err(CashierError::InvalidArgument(_))
        ));
    }

    #[test]
    fn json_keeps_optional_fields() {
        let product = Product::new("coin_100", ProductType::Consumable)
            .unwrap()
            .with_price("$0.99")
            .with_title("100 coins");

        let json = product.to_json().unwrap();
        assert!(json.contains("\"kind\":\"consumable\""));
        assert_eq!(Product::from_json(&json).unwrap(), product);
    }

    #[test]
    fn json_with_empty_id_is_rejected() {
        let json = r#"{"id":"","kind":"subscription"}"#;
        assert!(Product::from_json(json).is_err());
    }
}
