//! Google OAuth2 login.

use crate::connectors::ConnectorError;
use crate::models::ExternalIdentity;
use async_trait::async_trait;

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::GoogleOAuthClient;
#[cfg(test)]
pub use mock::MockGoogleConnector;

#[async_trait]
pub trait GoogleAuthConnector: Send + Sync {
    /// Authorize URL and the CSRF state embedded in it
    fn authorize_url(&self) -> (String, String);

    /// Exchanges an authorization code and resolves the Google account behind it
    async fn fetch_identity(&self, code: String) -> Result<ExternalIdentity, ConnectorError>;
}
