use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// Header name to value, applied verbatim to outbound requests.
pub type Headers = BTreeMap<String, String>;

/// Supplies the authenticated session headers. How they are harvested or
/// refreshed is up to the implementation.
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    async fn headers(&self) -> Result<Headers>;
}
