// Trait seam for the product database.
//
// ProductCatalog wraps off_client::OffClient so the pipelines can run against
// MockCatalog in tests: no network, canned products.
//
// The model seam is ai_client::TextModel.

use async_trait::async_trait;
use off_client::{OffClient, OffError, ProductLookup};
use serde_json::Value;

use crate::query::SearchParameters;

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Run a search. Products are returned untouched.
    async fn search(&self, params: &SearchParameters) -> Result<Vec<Value>, OffError>;

    /// Look up one product by barcode.
    async fn product(&self, barcode: &str) -> Result<ProductLookup, OffError>;
}

#[async_trait]
impl ProductCatalog for OffClient {
    async fn search(&self, params: &SearchParameters) -> Result<Vec<Value>, OffError> {
        OffClient::search(self, params.as_pairs()).await
    }

    async fn product(&self, barcode: &str) -> Result<ProductLookup, OffError> {
        OffClient::product(self, barcode).await
    }
}
