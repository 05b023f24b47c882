//! Rate limit quota lookup

use async_trait::async_trait;

use crate::client::ApiResult;
use crate::client::rate_limit::RateLimitSnapshot;

#[async_trait]
pub trait RateLimitApi: Send + Sync {
    /// Current core API quota for the authenticated token.
    async fn rate_limit(&self) -> ApiResult<RateLimitSnapshot>;
}
