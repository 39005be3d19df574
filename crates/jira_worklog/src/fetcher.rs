//! The fetch capability the aggregator is written against.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::response::RawResponse;

/// Retrieves a URL from the host application and hands back the undecoded body.
#[async_trait]
pub trait WorklogFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawResponse>;
}

#[async_trait]
impl<T> WorklogFetcher for Arc<T>
where
    T: WorklogFetcher + ?Sized,
{
    async fn fetch(&self, url: &str) -> Result<RawResponse> {
        (**self).fetch(url).await
    }
}
