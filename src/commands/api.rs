use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::api::{ApiRequest, ApiResponse, ProductApi};
use crate::commands::Command;

/// Perform one API request and post the response to a screen.
pub struct ApiCmd<M> {
    api: Arc<dyn ProductApi>,
    request: ApiRequest,
    tx: UnboundedSender<M>,
}

impl<M> ApiCmd<M> {
    pub fn new(api: Arc<dyn ProductApi>, request: ApiRequest, tx: UnboundedSender<M>) -> Self {
        Self { api, request, tx }
    }
}

#[async_trait]
impl<M> Command for ApiCmd<M>
where
    M: From<ApiResponse> + Send + 'static,
{
    fn name(&self) -> String {
        self.request.to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let request = self.request.to_string();
        let response = self.request.send(self.api.as_ref()).await;
        debug!(%request, ok = response.is_ok(), "Request settled");
        if self.tx.send(response.into()).is_err() {
            debug!("Screen closed before the response arrived, discarding it");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::api::ApiError;
    use crate::model::{Product, ProductId, ProductInput, ValidationError};

    struct Offline;

    #[async_trait]
    impl ProductApi for Offline {
        async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
            Ok(vec![])
        }
        async fn create_product(&self, _: &ProductInput) -> Result<(), ApiError> {
            Err(ValidationError::MissingField.into())
        }
        async fn update_product(&self, _: ProductId, _: &ProductInput) -> Result<(), ApiError> {
            Ok(())
        }
        async fn delete_product(&self, _: ProductId) -> Result<(), ApiError> {
            Ok(())
        }
        async fn login(&self, _: &str, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
        async fn register(&self, _: &str, _: &str, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_response_reaches_screen() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ApiResponse>();
        let cmd = ApiCmd::new(Arc::new(Offline), ApiRequest::ListProducts, tx);
        assert_eq!(cmd.name(), "Loading products");
        Box::new(cmd).execute().await.unwrap();
        assert!(matches!(rx.recv().await, Some(ApiResponse::ProductsLoaded(Ok(_)))));
    }

    #[tokio::test]
    async fn test_late_response_is_discarded() {
        let (tx, rx) = mpsc::unbounded_channel::<ApiResponse>();
        drop(rx);
        let cmd = ApiCmd::new(Arc::new(Offline), ApiRequest::DeleteProduct(7), tx);
        assert!(Box::new(cmd).execute().await.is_ok());
    }
}
