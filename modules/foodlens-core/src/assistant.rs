//! Free-form questions to the model, optionally grounded in product records.

use std::sync::Arc;

use ai_client::TextModel;
use futures::future::try_join_all;
use off_client::Product;
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::prompts::{compare_prompt, product_prompt};
use crate::require_text;
use crate::traits::ProductCatalog;

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 4;

/// A product as returned by the database plus the typed view used for prompts.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub barcode: String,
    pub raw: Value,
    pub details: Product,
}

#[derive(Clone)]
pub struct ProductAssistant {
    model: Arc<dyn TextModel>,
    catalog: Arc<dyn ProductCatalog>,
}

impl ProductAssistant {
    pub fn new(model: Arc<dyn TextModel>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { model, catalog }
    }

    /// Forward a prompt to the model unchanged.
    pub async fn prompt(&self, prompt: &str) -> Result<String> {
        let prompt = require_text(Some(prompt), "prompt")?;
        tracing::debug!(chars = prompt.len(), "Forwarding prompt");
        Ok(self.model.complete(prompt).await?)
    }

    pub async fn product(&self, barcode: &str) -> Result<ProductRecord> {
        let barcode = normalize_barcode(barcode)?;
        let lookup = self.catalog.product(&barcode).await?;

        if !lookup.is_found() {
            tracing::info!(barcode = %barcode, status = ?lookup.status, "Product not found");
            return Err(PipelineError::ProductNotFound(barcode));
        }

        let details = lookup.details().unwrap_or_else(|| {
            tracing::warn!(barcode = %barcode, "Product record has unexpected field types");
            Product::default()
        });

        Ok(ProductRecord {
            barcode,
            raw: lookup.product.unwrap_or_default(),
            details,
        })
    }

    /// Answer a question, prefixed with the product's facts when a barcode is given.
    pub async fn ask(&self, question: &str, barcode: Option<&str>) -> Result<String> {
        let question = require_text(Some(question), "question")?;

        let prompt = match barcode.filter(|b| !b.trim().is_empty()) {
            Some(barcode) => {
                let record = self.product(barcode).await?;
                product_prompt(&record.details, question)
            }
            None => question.to_string(),
        };

        Ok(self.model.complete(&prompt).await?)
    }

    /// Compare several products. Lookups run concurrently.
    pub async fn compare(&self, barcodes: &[String]) -> Result<String> {
        let mut unique: Vec<String> = Vec::with_capacity(barcodes.len());
        for raw in barcodes {
            let barcode = normalize_barcode(raw)?;
            if !unique.contains(&barcode) {
                unique.push(barcode);
            }
        }

        if !(MIN_COMPARE..=MAX_COMPARE).contains(&unique.len()) {
            return Err(PipelineError::InvalidInput(format!(
                "Compare needs between {MIN_COMPARE} and {MAX_COMPARE} distinct barcodes, got {}",
                unique.len()
            )));
        }

        let records = try_join_all(unique.iter().map(|b| self.product(b))).await?;
        tracing::info!(products = records.len(), "Comparing products");

        let pairs: Vec<(String, Product)> = records
            .into_iter()
            .map(|r| (r.barcode, r.details))
            .collect();

        Ok(self.model.complete(&compare_prompt(&pairs)).await?)
    }
}

/// Trimmed barcode; digits only.
pub fn normalize_barcode(raw: &str) -> Result<String> {
    let barcode = raw.trim();
    if barcode.is_empty() {
        return Err(PipelineError::MissingInput("barcode"));
    }
    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(PipelineError::InvalidInput(format!(
            "Invalid barcode: {barcode:?}"
        )));
    }
    Ok(barcode.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{FakeModel, MockCatalog};
    use serde_json::json;

    fn nutella() -> Value {
        json!({
            "product_name": "Nutella",
            "brands": "Ferrero",
            "nutriscore_grade": "e",
            "nova_group": "4",
            "nutriments": {"energy_100g": 2255, "sugars_100g": "56.3"}
        })
    }

    fn oat_milk() -> Value {
        json!({"product_name": "Oat drink", "labels_tags": ["en:vegan"]})
    }

    fn assistant(model: FakeModel, catalog: MockCatalog) -> (ProductAssistant, Arc<FakeModel>, Arc<MockCatalog>) {
        let model = Arc::new(model);
        let catalog = Arc::new(catalog);
        (
            ProductAssistant::new(model.clone(), catalog.clone()),
            model,
            catalog,
        )
    }

    #[tokio::test]
    async fn prompt_is_forwarded_verbatim() {
        let (assistant, model, _) = assistant(FakeModel::replying("Hello!"), MockCatalog::new());
        assert_eq!(assistant.prompt("Say hello").await.unwrap(), "Hello!");
        assert_eq!(model.prompts(), vec!["Say hello".to_string()]);
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let (assistant, model, _) = assistant(FakeModel::new(), MockCatalog::new());
        let err = assistant.prompt("").await.unwrap_err();
        assert_eq!(err.to_string(), "No prompt provided");
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn product_lookup_returns_raw_and_typed_views() {
        let (assistant, _, _) = assistant(
            FakeModel::new(),
            MockCatalog::new().on_product("3017620422003", nutella()),
        );
        let record = assistant.product(" 3017620422003 ").await.unwrap();
        assert_eq!(record.barcode, "3017620422003");
        assert_eq!(record.raw["product_name"], "Nutella");
        assert_eq!(record.details.nova_group, Some(4));
        assert_eq!(record.details.nutriments.sugars, Some(56.3));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let (assistant, _, _) = assistant(FakeModel::new(), MockCatalog::new());
        let err = assistant.product("123").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn malformed_barcode_never_reaches_the_catalog() {
        let (assistant, _, catalog) = assistant(FakeModel::new(), MockCatalog::new());
        let err = assistant.product("../admin").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(catalog.lookups().is_empty());
    }

    #[tokio::test]
    async fn ask_with_barcode_includes_product_facts() {
        let (assistant, model, _) = assistant(
            FakeModel::replying("Not very healthy."),
            MockCatalog::new().on_product("3017620422003", nutella()),
        );
        let answer = assistant
            .ask("Is this healthy?", Some("3017620422003"))
            .await
            .unwrap();
        assert_eq!(answer, "Not very healthy.");

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Product Name: Nutella"));
        assert!(prompt.contains("- Energy: 2255 kJ"));
        assert!(prompt.ends_with("Is this healthy?"));
    }

    #[tokio::test]
    async fn ask_without_barcode_forwards_question() {
        let (assistant, model, catalog) = assistant(FakeModel::replying("Yes."), MockCatalog::new());
        assistant.ask("Is oat milk vegan?", Some("  ")).await.unwrap();
        assert_eq!(model.last_prompt().unwrap(), "Is oat milk vegan?");
        assert!(catalog.lookups().is_empty());
    }

    #[tokio::test]
    async fn ask_about_unknown_product_skips_the_model() {
        let (assistant, model, _) = assistant(FakeModel::replying("unused"), MockCatalog::new());
        let err = assistant.ask("Is this healthy?", Some("999")).await.unwrap_err();
        assert!(matches!(err, PipelineError::ProductNotFound(_)));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn compare_fetches_every_product() {
        let (assistant, model, catalog) = assistant(
            FakeModel::replying("Oat drink has less sugar."),
            MockCatalog::new()
                .on_product("3017620422003", nutella())
                .on_product("7394376616037", oat_milk()),
        );
        let barcodes = vec!["3017620422003".to_string(), "7394376616037".to_string()];
        let text = assistant.compare(&barcodes).await.unwrap();
        assert_eq!(text, "Oat drink has less sugar.");

        let mut looked_up = catalog.lookups();
        looked_up.sort();
        assert_eq!(looked_up, vec!["3017620422003", "7394376616037"]);

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Product No 1 (3017620422003)\nProduct Name: Nutella"));
        assert!(prompt.contains("Product No 2 (7394376616037)\nProduct Name: Oat drink"));
    }

    #[tokio::test]
    async fn compare_needs_two_to_four_distinct_barcodes() {
        let (assistant, model, _) = assistant(FakeModel::new(), MockCatalog::new());

        let same = vec!["123".to_string(), " 123".to_string()];
        let err = assistant.compare(&same).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));

        let many: Vec<String> = (1..=5).map(|i| i.to_string()).collect();
        let err = assistant.compare(&many).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));

        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn compare_fails_when_any_product_is_missing() {
        let (assistant, model, _) = assistant(
            FakeModel::replying("unused"),
            MockCatalog::new().on_product("3017620422003", nutella()),
        );
        let barcodes = vec!["3017620422003".to_string(), "404".to_string()];
        let err = assistant.compare(&barcodes).await.unwrap_err();
        assert!(matches!(err, PipelineError::ProductNotFound(ref b) if b == "404"));
        assert!(model.prompts().is_empty());
    }
}
