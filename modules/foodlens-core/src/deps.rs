use std::sync::Arc;

use ai_client::{Gemini, TextModel};
use anyhow::{Context, Result};
use off_client::OffClient;

use crate::assistant::ProductAssistant;
use crate::config::AppConfig;
use crate::search::SearchPipeline;
use crate::traits::ProductCatalog;

/// Central dependency container passed to all handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub model: Arc<dyn TextModel>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub config: AppConfig,
}

impl ServerDeps {
    pub fn new(
        model: Arc<dyn TextModel>,
        catalog: Arc<dyn ProductCatalog>,
        config: AppConfig,
    ) -> Self {
        Self {
            model,
            catalog,
            config,
        }
    }

    /// Build the live Gemini and Open Food Facts clients from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let mut gemini = Gemini::with_timeout(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.request_timeout,
        )
        .context("Failed to build Gemini client")?;
        if let Some(url) = &config.gemini_base_url {
            gemini = gemini.with_base_url(url);
        }
        tracing::info!(model = gemini.model(), "Gemini client ready");

        let off = OffClient::new(&config.off_base_url, config.request_timeout)
            .with_context(|| format!("Invalid OFF_BASE_URL {:?}", config.off_base_url))?;

        Ok(Self::new(Arc::new(gemini), Arc::new(off), config))
    }

    pub fn search_pipeline(&self) -> SearchPipeline {
        SearchPipeline::new(self.model.clone(), self.catalog.clone())
    }

    pub fn assistant(&self) -> ProductAssistant {
        ProductAssistant::new(self.model.clone(), self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).map(|v| v.to_string())).unwrap()
    }

    #[test]
    fn builds_live_clients() {
        let deps = ServerDeps::from_config(config(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert_eq!(deps.config.port, 3000);
    }

    #[test]
    fn rejects_bad_off_base_url() {
        let result = ServerDeps::from_config(config(&[
            ("GEMINI_API_KEY", "secret"),
            ("OFF_BASE_URL", "not a url"),
        ]));
        assert!(result.is_err());
    }
}
