use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

use super::message::{CompletionEvent, CompletionRequest};
use crate::error::CashierError;

/// Sending side of the completion channel. Cheap to clone; hand one to whatever
/// part of the host receives platform result callbacks.
#[derive(Clone)]
pub struct CompletionClient {
    sender: mpsc::Sender<CompletionRequest>,
}

impl CompletionClient {
    pub fn new(sender: mpsc::Sender<CompletionRequest>) -> Self {
        Self { sender }
    }

    /// Routes `event` and reports whether a handler consumed it.
    #[instrument(skip(self, event), fields(request_code = event.request_code))]
    pub async fn route(&self, event: CompletionEvent) -> Result<bool, CashierError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CompletionRequest { event, respond_to })
            .await
            .map_err(|_| CashierError::RouterClosed)?;
        response.await.map_err(|_| CashierError::RouterDropped)
    }
}
