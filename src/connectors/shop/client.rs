use super::ShopFetcher;
use crate::configuration::ScraperSettings;
use crate::connectors::errors::{from_status, ConnectorError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;

pub struct ShopHttpClient {
    http_client: reqwest::Client,
}

impl ShopHttpClient {
    pub fn new(settings: &ScraperSettings) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl ShopFetcher for ShopHttpClient {
    #[tracing::instrument(name = "Fetch shop page", skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<String, ConnectorError> {
        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "text/html")
            .header(ACCEPT_LANGUAGE, "ru-RU,ru;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(from_status(status, body));
        }

        Ok(body)
    }
}
