use std::time::Duration;

use anyhow::{bail, Context, Result};

use ai_client::gemini::DEFAULT_MODEL;
use off_client::DEFAULT_BASE_URL as DEFAULT_OFF_BASE_URL;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables, once, at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Model service
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,

    // Product database
    pub off_base_url: String,

    // HTTP
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = get("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable is required")?;

        let port = match get("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a number, got {p:?}"))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs: u64 = match get("REQUEST_TIMEOUT_SECS") {
            Some(t) => t
                .trim()
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be a number, got {t:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL"),
            off_base_url: get("OFF_BASE_URL").unwrap_or_else(|| DEFAULT_OFF_BASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            let head = ai_client::truncate_to_char_boundary(val, n);
            format!("{}...({} chars)", head, val.len())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  GEMINI_API_KEY: {}", preview(&self.gemini_api_key));
        tracing::info!("  GEMINI_MODEL: {}", self.gemini_model);
        tracing::info!(
            "  GEMINI_BASE_URL: {}",
            self.gemini_base_url.as_deref().unwrap_or("<default>")
        );
        tracing::info!("  OFF_BASE_URL: {}", self.off_base_url);
        tracing::info!("  REQUEST_TIMEOUT: {:?}", self.request_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.gemini_base_url, None);
        assert_eq!(config.off_base_url, "https://world.openfoodfacts.org");
        assert_eq!(config.gemini_model, ai_client::gemini::DEFAULT_MODEL);
        assert_eq!(config.off_base_url, off_client::DEFAULT_BASE_URL);
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn api_key_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = config_from(&[("GEMINI_API_KEY", "  ")]).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("OFF_BASE_URL", "http://localhost:9000"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.off_base_url, "http://localhost:9000");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(config_from(&[("GEMINI_API_KEY", "k"), ("PORT", "http")]).is_err());
        assert!(config_from(&[("GEMINI_API_KEY", "k"), ("REQUEST_TIMEOUT_SECS", "0")]).is_err());
    }
}
