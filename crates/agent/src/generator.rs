//! The text-generation seam.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Turns a prompt into raw model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Whether a credential is configured. Generators without one fail fast
    /// with [`GenerationError::MissingCredential`].
    fn has_credential(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
