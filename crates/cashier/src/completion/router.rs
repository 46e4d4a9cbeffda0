//! # Completion Router
//!
//! The router is a small actor: it owns the receiving end of the completion channel
//! and an ordered list of handlers, and processes events one at a time. Each event is
//! offered to the handlers in registration order until one of them claims it.
//!
//! Routing sequentially matters: a vendor must complete exactly one pending flow per
//! matching event, and processing events in arrival order keeps that true even when
//! the host forwards callbacks from several threads.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::client::CompletionClient;
use super::message::CompletionRequest;
use super::CompletionHandler;

pub struct CompletionRouter {
    receiver: mpsc::Receiver<CompletionRequest>,
    handlers: Vec<Arc<dyn CompletionHandler>>,
}

impl CompletionRouter {
    /// Creates a router and the client used to feed it.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - Capacity of the channel, at least 1. When full,
    ///   `CompletionClient::route` waits for space.
    /// * `handlers` - Tried in order for every event.
    pub fn new(
        buffer_size: usize,
        handlers: Vec<Arc<dyn CompletionHandler>>,
    ) -> (Self, CompletionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let router = Self { receiver, handlers };
        (router, CompletionClient::new(sender))
    }

    /// Runs the routing loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(handlers = self.handlers.len(), "Completion router started");
        let mut consumed = 0usize;
        let mut ignored = 0usize;

        while let Some(CompletionRequest { event, respond_to }) = self.receiver.recv().await {
            let request_code = event.request_code;
            debug!(request_code, result_code = event.result_code, "Route");

            match self.handlers.iter().position(|handler| handler.route(&event)) {
                Some(handler) => {
                    consumed += 1;
                    info!(request_code, handler, "Completion consumed");
                    let _ = respond_to.send(true);
                }
                None => {
                    ignored += 1;
                    warn!(request_code, "Completion not recognized by any handler");
                    let _ = respond_to.send(false);
                }
            }
        }

        info!(consumed, ignored, "Completion router shutdown");
    }
}
