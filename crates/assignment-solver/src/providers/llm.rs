//! LLM provider trait for the last-resort answer

use async_trait::async_trait;
use crate::error::Result;

/// Trait for model-backed answering
///
/// Implementations:
/// - `ChatCompletionClient`: any OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Answer `question`, optionally grounded on `context` (empty when there is none).
    ///
    /// One attempt only; failures surface as `Error::Upstream`.
    async fn ask(&self, question: &str, context: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
