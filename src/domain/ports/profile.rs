use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::UserId;

/// Produces the personalization block of the system prompt.
///
/// The text is opaque to the assistant.
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn profile_summary(&self, user_id: UserId) -> DomainResult<String>;
}
