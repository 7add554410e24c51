use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodlens_core::{AppConfig, ServerDeps};

mod rest;

pub struct AppState {
    pub search: foodlens_core::SearchPipeline,
    pub assistant: foodlens_core::ProductAssistant,
}

impl AppState {
    pub fn from_deps(deps: &ServerDeps) -> Self {
        Self {
            search: deps.search_pipeline(),
            assistant: deps.assistant(),
        }
    }
}

/// Targets logged at info on top of `RUST_LOG`.
const DEFAULT_LOG_DIRECTIVES: &[&str] = &["foodlens=info", "off_client=info", "ai_client=info"];

fn with_default_directives(mut filter: EnvFilter) -> Result<EnvFilter> {
    for directive in DEFAULT_LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(with_default_directives(EnvFilter::from_default_env())?)
        .init();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr();
    let deps = ServerDeps::from_config(config)?;

    let state = Arc::new(AppState::from_deps(&deps));
    let app = rest::router(state);

    info!("Foodlens server starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
