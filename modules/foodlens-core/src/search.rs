//! Natural-language product search: query → prompt → model → filters → search.

use std::sync::Arc;

use ai_client::{truncate_to_char_boundary, TextModel};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::filters::{parse_filters, FilterSet};
use crate::prompts::filter_prompt;
use crate::query::{translate, SearchParameters};
use crate::require_text;
use crate::traits::ProductCatalog;

/// Successful search: the filters the model produced and the matching products.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub filters: FilterSet,
    pub products: Vec<Value>,
}

#[derive(Clone)]
pub struct SearchPipeline {
    model: Arc<dyn TextModel>,
    catalog: Arc<dyn ProductCatalog>,
}

impl SearchPipeline {
    pub fn new(model: Arc<dyn TextModel>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { model, catalog }
    }

    /// Ask the model for filters and translate them, without searching.
    pub async fn plan(&self, query: &str) -> Result<(FilterSet, SearchParameters)> {
        let query = require_text(Some(query), "query")?;

        let prompt = filter_prompt(query);
        tracing::debug!(prompt = %prompt, "Filter prompt");

        let response = self.model.complete(&prompt).await?;
        tracing::debug!(
            response = truncate_to_char_boundary(&response, 2000),
            "Model response"
        );

        let filters = parse_filters(&response)?;
        let params = translate(&filters);
        tracing::debug!(
            filters = filters.len(),
            query_string = %params.to_query_string(),
            "Translated filters"
        );

        Ok((filters, params))
    }

    /// Run the full search for a free-text query.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let (filters, params) = self.plan(query).await?;
        let products = self.catalog.search(&params).await?;

        tracing::info!(
            filters = filters.len(),
            products = products.len(),
            "Search complete"
        );

        Ok(SearchOutcome { filters, products })
    }
}
