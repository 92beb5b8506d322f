//! Where feed bodies come from.
use async_trait::async_trait;
use quake_http::{HttpClient, HttpError, RequestOpts};
use serde_json::Value;

/// Fetches the raw JSON body behind a feed URL.
///
/// [`HttpClient`] is the production implementation and sends
/// `Accept: application/json`; tests plug in canned or gated sources.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, HttpError>;
}

#[async_trait]
impl FeedSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Value, HttpError> {
        self.get_json(url, RequestOpts::json()).await
    }
}
