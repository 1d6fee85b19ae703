use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::ports::header_provider::Headers;

/// Outbound search endpoint. One call posts one query payload and returns
/// the decoded JSON body.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Non-success statuses surface as `ScrapeError::Transport` carrying `offset`.
    async fn post_search(
        &self,
        currency: &str,
        offset: u32,
        payload: &Value,
        headers: &Headers,
    ) -> Result<Value>;
}
