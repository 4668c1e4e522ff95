/// Answer generation trait and sampling parameters.
pub mod gemini;
pub mod mock;

use crate::gemini::ProviderError;

/// Sampling settings for a generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for language-model answer generation.
pub trait AnswerGenerator: Send + Sync {
    /// Generate text for an assembled prompt. The returned text is passed
    /// to the caller verbatim, with no post-processing.
    fn generate(&self, prompt: &str, params: GenerationParams) -> Result<String, ProviderError>;
}
