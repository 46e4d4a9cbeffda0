use cashier::Product;
use serde::{Deserialize, Serialize};

/// Configuration of a sandbox store.
///
/// ```json
/// {
///   "online": true,
///   "buffer_size": 32,
///   "catalog": [{ "id": "coin_100", "kind": "consumable", "price": "$0.99" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Products the store sells.
    pub catalog: Vec<Product>,
    /// An offline store refuses connections, buy intents and consumes.
    pub online: bool,
    /// Capacity of the store's request channel.
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            online: true,
            buffer_size: 32,
        }
    }
}

impl StoreConfig {
    pub fn with_product(mut self, product: Product) -> Self {
        self.catalog.push(product);
        self
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }
}
