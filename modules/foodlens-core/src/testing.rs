// Test doubles for the two trait seams.
//
// - FakeModel (TextModel): queued canned replies, records every prompt
// - MockCatalog (ProductCatalog): canned search results and barcode lookups,
//   records every search
//
// Available to other crates' tests through the `testing` feature.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use ai_client::{AiError, TextModel};
use async_trait::async_trait;
use off_client::{OffError, ProductLookup};
use serde_json::Value;

use crate::query::SearchParameters;
use crate::traits::ProductCatalog;

// ---------------------------------------------------------------------------
// FakeModel
// ---------------------------------------------------------------------------

enum Reply {
    Text(String),
    Error(AiError),
}

/// Replies are consumed in order. Once the queue is empty every call fails
/// with `AiError::EmptyResponse`.
/// Builder pattern: `.reply()`, `.fail()`.
pub struct FakeModel {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand for a model with a single canned reply.
    pub fn replying(text: &str) -> Self {
        Self::new().reply(text)
    }

    pub fn reply(self, text: &str) -> Self {
        self.push(Reply::Text(text.to_string()));
        self
    }

    pub fn fail(self, error: AiError) -> Self {
        self.push(Reply::Error(error));
        self
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

impl Default for FakeModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextModel for FakeModel {
    async fn complete(&self, prompt: &str) -> ai_client::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error(e)) => Err(e),
            None => Err(AiError::EmptyResponse(Some("no canned reply".into()))),
        }
    }
}

// ---------------------------------------------------------------------------
// MockCatalog
// ---------------------------------------------------------------------------

/// Canned product database. Unregistered barcodes look up as not found.
/// Builder pattern: `.on_search()`, `.on_product()`, `.failing_search()`.
pub struct MockCatalog {
    products: Vec<Value>,
    lookups: HashMap<String, Value>,
    search_failure: Option<(u16, String)>,
    searches: Mutex<Vec<SearchParameters>>,
    looked_up: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            lookups: HashMap::new(),
            search_failure: None,
            searches: Mutex::new(Vec::new()),
            looked_up: Mutex::new(Vec::new()),
        }
    }

    /// Products returned by every search.
    pub fn on_search(mut self, products: Vec<Value>) -> Self {
        self.products = products;
        self
    }

    pub fn on_product(mut self, barcode: &str, product: Value) -> Self {
        self.lookups.insert(barcode.to_string(), product);
        self
    }

    /// Every search fails with an API error.
    pub fn failing_search(mut self, status: u16, message: &str) -> Self {
        self.search_failure = Some((status, message.to_string()));
        self
    }

    /// Parameters of every search so far.
    pub fn searches(&self) -> Vec<SearchParameters> {
        self.searches.lock().unwrap().clone()
    }

    /// Barcodes looked up so far.
    pub fn lookups(&self) -> Vec<String> {
        self.looked_up.lock().unwrap().clone()
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductCatalog for MockCatalog {
    async fn search(&self, params: &SearchParameters) -> Result<Vec<Value>, OffError> {
        self.searches.lock().unwrap().push(params.clone());
        if let Some((status, message)) = &self.search_failure {
            return Err(OffError::Api {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(self.products.clone())
    }

    async fn product(&self, barcode: &str) -> Result<ProductLookup, OffError> {
        self.looked_up.lock().unwrap().push(barcode.to_string());
        let product = self.lookups.get(barcode).cloned();
        Ok(ProductLookup {
            code: Some(barcode.to_string()),
            status: Some(if product.is_some() { 1 } else { 0 }),
            status_verbose: None,
            product,
        })
    }
}
