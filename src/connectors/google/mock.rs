use super::GoogleAuthConnector;
use crate::connectors::ConnectorError;
use crate::models::ExternalIdentity;
use async_trait::async_trait;

pub struct MockGoogleConnector;

#[async_trait]
impl GoogleAuthConnector for MockGoogleConnector {
    fn authorize_url(&self) -> (String, String) {
        (
            "https://accounts.example/auth?state=mock-state".to_string(),
            "mock-state".to_string(),
        )
    }

    async fn fetch_identity(&self, code: String) -> Result<ExternalIdentity, ConnectorError> {
        if code == "bad" {
            return Err(ConnectorError::Unauthorized("invalid_grant".to_string()));
        }

        Ok(ExternalIdentity {
            google_id: Some(format!("google-{code}")),
            email: Some(format!("{code}@example.com")),
            name: "Mock Google".to_string(),
            ..Default::default()
        })
    }
}
