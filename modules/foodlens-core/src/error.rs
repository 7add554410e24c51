//! Typed errors for each stage of the search and assistant pipelines.

use ai_client::AiError;
use off_client::OffError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required request field was absent or blank.
    #[error("No {0} provided")]
    MissingInput(&'static str),

    /// A request field was present but unusable.
    #[error("{0}")]
    InvalidInput(String),

    /// The model service failed (network, API status, empty completion).
    #[error("Model request failed: {0}")]
    Model(#[from] AiError),

    /// The model's reply was not valid JSON after removing code fences.
    #[error("Invalid JSON returned from model: {reason}")]
    Parse { raw: String, reason: String },

    /// The reply was valid JSON but a filter value had an unsupported shape.
    #[error("Model output does not match the filter schema: {0}")]
    Schema(String),

    /// The product database failed.
    #[error("Product search failed: {0}")]
    Search(#[from] OffError),

    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    NotFound,
    Upstream,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MissingInput(_) | PipelineError::InvalidInput(_) => ErrorKind::Input,
            PipelineError::Search(OffError::InvalidBarcode(_)) => ErrorKind::Input,
            PipelineError::ProductNotFound(_) => ErrorKind::NotFound,
            PipelineError::Model(_)
            | PipelineError::Parse { .. }
            | PipelineError::Schema(_)
            | PipelineError::Search(_) => ErrorKind::Upstream,
        }
    }
}
