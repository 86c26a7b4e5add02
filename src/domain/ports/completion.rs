use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ChatMessage;

/// Chat-style completion port.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send the full message list and return the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> DomainResult<String>;
}
