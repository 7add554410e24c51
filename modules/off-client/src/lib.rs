pub mod error;
pub mod types;

pub use error::{OffError, Result};
pub use types::{Nutriments, Product, ProductLookup, SearchResponse};

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

const SEARCH_PATH: &str = "cgi/search.pl";
const USER_AGENT: &str = concat!("foodlens/", env!("CARGO_PKG_VERSION"));

pub struct OffClient {
    client: reqwest::Client,
    base_url: Url,
}

impl OffClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OffError::Client(e.to_string()))?;

        // A trailing slash makes `Url::join` append instead of replacing the last segment.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;

        Ok(Self { client, base_url })
    }

    /// Full search URL: the search endpoint with `params` form-encoded in order.
    /// Repeated keys are kept, which the search endpoint reads as multi-valued filters.
    pub fn search_url(&self, params: &[(String, String)]) -> Result<Url> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    pub fn product_url(&self, barcode: &str) -> Result<Url> {
        let barcode = barcode.trim();
        if barcode.is_empty() || !barcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(OffError::InvalidBarcode(barcode.to_string()));
        }
        Ok(self
            .base_url
            .join(&format!("api/v0/product/{barcode}.json"))?)
    }

    /// Run a product search. Returns the `products` array, or an empty one when absent.
    pub async fn search(&self, params: &[(String, String)]) -> Result<Vec<serde_json::Value>> {
        let url = self.search_url(params)?;
        tracing::info!(url = %url, "Searching Open Food Facts");

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OffError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let products = parsed.into_products();
        tracing::info!(count = products.len(), "Fetched products");

        Ok(products)
    }

    /// Look up a single product by barcode.
    pub async fn product(&self, barcode: &str) -> Result<ProductLookup> {
        let url = self.product_url(barcode)?;
        tracing::debug!(url = %url, "Looking up product");

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(ProductLookup {
                code: Some(barcode.trim().to_string()),
                status: Some(0),
                status_verbose: Some("product not found".to_string()),
                product: None,
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OffError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
