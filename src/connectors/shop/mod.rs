//! HTTP access to the shop whose catalog is scraped.

use crate::connectors::ConnectorError;
use async_trait::async_trait;

pub mod client;

pub use client::ShopHttpClient;

#[async_trait]
pub trait ShopFetcher: Send + Sync {
    /// Returns the raw HTML of a listing page.
    async fn fetch_page(&self, url: &str) -> Result<String, ConnectorError>;
}
