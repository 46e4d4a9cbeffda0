//! # Store Client
//!
//! Typed handle to the [`StoreActor`](super::StoreActor). Cheap to clone.

use cashier::{CompletionEvent, Product, ProductId};
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

use super::error::StoreError;
use super::message::{Receipt, Response, StoreRequest};

#[derive(Clone, Debug)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// True once the store actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::StoreClosed)?;
        response.await.map_err(|_| StoreError::StoreDropped)?
    }

    #[instrument(skip(self))]
    pub async fn connect(&self, app_id: &str) -> Result<(), StoreError> {
        let app_id = app_id.to_string();
        self.request(|respond_to| StoreRequest::Connect { app_id, respond_to })
            .await
    }

    pub async fn catalog(&self) -> Result<Vec<Product>, StoreError> {
        self.request(|respond_to| StoreRequest::Catalog { respond_to })
            .await
    }

    #[instrument(skip(self, developer_payload))]
    pub async fn buy_intent(
        &self,
        app_id: &str,
        request_code: i32,
        product_id: ProductId,
        developer_payload: Option<String>,
    ) -> Result<(), StoreError> {
        let app_id = app_id.to_string();
        self.request(|respond_to| StoreRequest::BuyIntent {
            app_id,
            request_code,
            product_id,
            developer_payload,
            respond_to,
        })
        .await
    }

    /// Finishes the purchase screen for `request_code`, as if the user had tapped
    /// "buy" (`approve`) or dismissed it.
    #[instrument(skip(self))]
    pub async fn complete_flow(
        &self,
        app_id: &str,
        request_code: i32,
        approve: bool,
    ) -> Result<CompletionEvent, StoreError> {
        let app_id = app_id.to_string();
        self.request(|respond_to| StoreRequest::CompleteFlow {
            app_id,
            request_code,
            approve,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn consume(&self, app_id: &str, token: &str) -> Result<(), StoreError> {
        let app_id = app_id.to_string();
        let token = token.to_string();
        self.request(|respond_to| StoreRequest::Consume {
            app_id,
            token,
            respond_to,
        })
        .await
    }

    pub async fn owned(&self, app_id: &str) -> Result<Vec<Receipt>, StoreError> {
        let app_id = app_id.to_string();
        self.request(|respond_to| StoreRequest::Owned { app_id, respond_to })
            .await
    }

    pub async fn set_online(&self, online: bool) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::SetOnline { online, respond_to })
            .await
    }

    /// Stops the store. Every client, including clones, sees `StoreClosed` afterwards.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Shutdown { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_mock_client() -> (StoreClient, mpsc::Receiver<StoreRequest>) {
        let (sender, receiver) = mpsc::channel(10);
        (StoreClient::new(sender), receiver)
    }

    #[tokio::test]
    async fn consume_forwards_request_and_answer() {
        let (client, mut receiver) = create_mock_client();

        let store = tokio::spawn(async move {
            match receiver.recv().await {
                Some(StoreRequest::Consume {
                    app_id,
                    token,
                    respond_to,
                }) => {
                    assert_eq!(app_id, "com.example.game");
                    assert_eq!(token, "token-1");
                    let _ = respond_to.send(Err(StoreError::ItemNotOwned(token)));
                }
                other => panic!("Expected Consume, got {:?}", other),
            }
        });

        let result = client.consume("com.example.game", "token-1").await;
        assert_eq!(result, Err(StoreError::ItemNotOwned("token-1".into())));
        store.await.unwrap();
    }

    #[tokio::test]
    async fn closed_store_is_reported() {
        let (client, receiver) = create_mock_client();
        drop(receiver);

        assert!(client.is_closed());
        assert_eq!(client.catalog().await, Err(StoreError::StoreClosed));
    }

    #[tokio::test]
    async fn dropped_responder_is_reported() {
        let (client, mut receiver) = create_mock_client();

        let store = tokio::spawn(async move {
            // Receive and drop the request without answering.
            let _ = receiver.recv().await;
        });

        assert_eq!(client.set_online(false).await, Err(StoreError::StoreDropped));
        store.await.unwrap();
    }
}
