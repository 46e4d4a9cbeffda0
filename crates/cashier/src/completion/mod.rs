//! # Completion Routing
//!
//! Some purchase flows leave the process (a store UI, a payment sheet) and finish
//! with a platform callback the host receives. That callback has to find its way
//! back to the vendor that launched the flow.
//!
//! The host can call [`Cashier::route_completion_event`](crate::Cashier::route_completion_event)
//! directly, or decouple from its own callback shape with an inbound channel:
//!
//! ```rust,ignore
//! let cashier = Arc::new(cashier);
//! let (router, completions) = CompletionRouter::new(32, vec![cashier.clone()]);
//! tokio::spawn(router.run());
//!
//! // Wherever the platform result arrives:
//! let consumed = completions.route(CompletionEvent::ok(1001, receipt_json)).await?;
//! ```
//!
//! Any type implementing [`CompletionHandler`] can be registered, so a host that
//! runs several cashiers (or its own handlers) chains them in one router.

mod client;
mod message;
mod router;

pub use client::CompletionClient;
pub use message::*;
pub use router::CompletionRouter;

/// Something that may recognize and consume a completion event.
pub trait CompletionHandler: Send + Sync {
    /// Returns `true` iff the event was recognized and consumed.
    fn route(&self, event: &CompletionEvent) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Claims a single request code and counts every event it sees.
    struct Claims {
        request_code: i32,
        seen: AtomicUsize,
    }

    impl Claims {
        fn new(request_code: i32) -> Arc<Self> {
            Arc::new(Self {
                request_code,
                seen: AtomicUsize::new(0),
            })
        }
    }

    impl CompletionHandler for Claims {
        fn route(&self, event: &CompletionEvent) -> bool {
            self.seen.fetch_add(1, Ordering::SeqCst);
            event.request_code == self.request_code
        }
    }

    #[tokio::test]
    async fn tries_handlers_in_order_and_stops_at_first_match() {
        let first = Claims::new(1);
        let second = Claims::new(2);
        let (router, client) = CompletionRouter::new(
            4,
            vec![first.clone() as Arc<dyn CompletionHandler>, second.clone()],
        );
        let handle = tokio::spawn(router.run());

        assert!(client.route(CompletionEvent::canceled(1)).await.unwrap());
        assert_eq!(first.seen.load(Ordering::SeqCst), 1);
        assert_eq!(second.seen.load(Ordering::SeqCst), 0);

        assert!(client.route(CompletionEvent::ok(2, "{}")).await.unwrap());
        assert_eq!(second.seen.load(Ordering::SeqCst), 1);

        assert!(!client.route(CompletionEvent::canceled(3)).await.unwrap());
        assert_eq!(first.seen.load(Ordering::SeqCst), 3);
        assert_eq!(second.seen.load(Ordering::SeqCst), 2);

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn zero_buffer_still_routes() {
        let handler = Claims::new(7);
        let (router, client) =
            CompletionRouter::new(0, vec![handler.clone() as Arc<dyn CompletionHandler>]);
        let handle = tokio::spawn(router.run());

        assert!(client.route(CompletionEvent::canceled(7)).await.unwrap());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn route_fails_once_router_is_gone() {
        let (router, client) = CompletionRouter::new(1, Vec::new());
        drop(router);

        let result = client.route(CompletionEvent::canceled(1)).await;
        assert!(matches!(result, Err(crate::CashierError::RouterClosed)));
    }
}
