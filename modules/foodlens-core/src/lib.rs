pub mod assistant;
pub mod config;
pub mod deps;
pub mod error;
pub mod filters;
pub mod prompts;
pub mod query;
pub mod search;
pub mod template;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use assistant::{ProductAssistant, ProductRecord};
pub use config::AppConfig;
pub use deps::ServerDeps;
pub use error::{ErrorKind, PipelineError, Result};
pub use filters::{parse_filters, FilterSet, FilterValue};
pub use query::{translate, SearchParameters};
pub use search::{SearchOutcome, SearchPipeline};
pub use traits::ProductCatalog;

/// Reject a missing or blank required text field.
pub fn require_text<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PipelineError::MissingInput(field)),
    }
}
