//! # Listener Contracts
//!
//! Every purchase or consume call resolves to exactly one terminal callback on its
//! listener: `success` or `failure`. Failures carry the originating domain object so
//! the host can correlate the outcome without keeping its own bookkeeping.
//!
//! Listeners are trait objects so vendors can park them (e.g. until a completion
//! event is routed back). For callers that prefer to `.await` an outcome, the
//! [`PurchaseResponder`] and [`ConsumeResponder`] adapters forward the callback into a
//! oneshot channel; [`Cashier::purchase_outcome`](crate::Cashier::purchase_outcome) uses them.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::VendorError;
use crate::model::{Product, Purchase};

/// Receives the terminal outcome of a purchase flow.
pub trait PurchaseListener: Send + Sync {
    fn success(&self, purchase: Purchase);
    fn failure(&self, product: Product, error: VendorError);
}

/// Receives the terminal outcome of a consume flow.
pub trait ConsumeListener: Send + Sync {
    fn success(&self, purchase: Purchase);
    fn failure(&self, purchase: Purchase, error: VendorError);
}

impl<L: PurchaseListener + ?Sized> PurchaseListener for Box<L> {
    fn success(&self, purchase: Purchase) {
        (**self).success(purchase)
    }

    fn failure(&self, product: Product, error: VendorError) {
        (**self).failure(product, error)
    }
}

impl<L: PurchaseListener + ?Sized> PurchaseListener for Arc<L> {
    fn success(&self, purchase: Purchase) {
        (**self).success(purchase)
    }

    fn failure(&self, product: Product, error: VendorError) {
        (**self).failure(product, error)
    }
}

impl<L: ConsumeListener + ?Sized> ConsumeListener for Box<L> {
    fn success(&self, purchase: Purchase) {
        (**self).success(purchase)
    }

    fn failure(&self, purchase: Purchase, error: VendorError) {
        (**self).failure(purchase, error)
    }
}

impl<L: ConsumeListener + ?Sized> ConsumeListener for Arc<L> {
    fn success(&self, purchase: Purchase) {
        (**self).success(purchase)
    }

    fn failure(&self, purchase: Purchase, error: VendorError) {
        (**self).failure(purchase, error)
    }
}

/// Terminal outcome of a purchase.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Success(Purchase),
    Failure { product: Product, error: VendorError },
}

impl PurchaseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PurchaseOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<Purchase, VendorError> {
        match self {
            PurchaseOutcome::Success(purchase) => Ok(purchase),
            PurchaseOutcome::Failure { error, .. } => Err(error),
        }
    }
}

/// Terminal outcome of a consume.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOutcome {
    Success(Purchase),
    Failure { purchase: Purchase, error: VendorError },
}

impl ConsumeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConsumeOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<Purchase, VendorError> {
        match self {
            ConsumeOutcome::Success(purchase) => Ok(purchase),
            ConsumeOutcome::Failure { error, .. } => Err(error),
        }
    }
}

/// Holds the sending half of a oneshot channel and fires it at most once.
struct OnceSender<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> OnceSender<T> {
    fn new(sender: oneshot::Sender<T>) -> Self {
        Self {
            slot: Mutex::new(Some(sender)),
        }
    }

    fn send(&self, value: T) {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            // The receiver may already be gone; the outcome is then simply dropped.
            Some(sender) => {
                let _ = sender.send(value);
            }
            None => tracing::warn!("Listener fired more than once, ignoring"),
        }
    }
}

/// [`PurchaseListener`] that forwards the outcome into a oneshot channel.
pub struct PurchaseResponder {
    sender: OnceSender<PurchaseOutcome>,
}

impl PurchaseResponder {
    pub fn channel() -> (Self, oneshot::Receiver<PurchaseOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: OnceSender::new(sender),
            },
            receiver,
        )
    }
}

impl PurchaseListener for PurchaseResponder {
    fn success(&self, purchase: Purchase) {
        self.sender.send(PurchaseOutcome::Success(purchase));
    }

    fn failure(&self, product: Product, error: VendorError) {
        self.sender.send(PurchaseOutcome::Failure { product, error });
    }
}

/// [`ConsumeListener`] that forwards the outcome into a oneshot channel.
pub struct ConsumeResponder {
    sender: OnceSender<ConsumeOutcome>,
}

impl ConsumeResponder {
    pub fn channel() -> (Self, oneshot::Receiver<ConsumeOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: OnceSender::new(sender),
            },
            receiver,
        )
    }
}

impl ConsumeListener for ConsumeResponder {
    fn success(&self, purchase: Purchase) {
        self.sender.send(ConsumeOutcome::Success(purchase));
    }

    fn failure(&self, purchase: Purchase, error: VendorError) {
        self.sender.send(ConsumeOutcome::Failure { purchase, error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductType;

    fn coins() -> Product {
        Product::new("coin_100", ProductType::Consumable).unwrap()
    }

    #[tokio::test]
    async fn responder_delivers_first_outcome_only() {
        let (listener, outcome) = PurchaseResponder::channel();

        listener.failure(coins(), VendorError::PurchaseCanceled);
        listener.success(Purchase::new(coins(), "o1", "t1", "{}"));

        assert_eq!(
            outcome.await.unwrap(),
            PurchaseOutcome::Failure {
                product: coins(),
                error: VendorError::PurchaseCanceled,
            }
        );
    }

    #[tokio::test]
    async fn dropped_responder_closes_channel() {
        let (listener, outcome) = ConsumeResponder::channel();
        drop(listener);
        assert!(outcome.await.is_err());
    }

    #[test]
    fn outcome_converts_into_result() {
        let purchase = Purchase::new(coins(), "o1", "t1", "{}");
        assert_eq!(
            ConsumeOutcome::Success(purchase.clone()).into_result(),
            Ok(purchase.clone())
        );
        assert_eq!(
            ConsumeOutcome::Failure {
                purchase,
                error: VendorError::ConsumeNotOwned,
            }
            .into_result(),
            Err(VendorError::ConsumeNotOwned)
        );
    }
}
