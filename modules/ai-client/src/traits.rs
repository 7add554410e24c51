use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// TextModel Trait
// =============================================================================

/// A generative model used as an opaque text transformer: prompt in, completion out.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
