use super::GoogleAuthConnector;
use crate::configuration::GoogleSettings;
use crate::connectors::errors::ConnectorError;
use crate::models::ExternalIdentity;
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;

type GoogleClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ExternalIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        let name = info
            .name
            .clone()
            .or_else(|| info.email.as_ref().and_then(|email| email.split('@').next().map(String::from)))
            .unwrap_or_else(|| "Google user".to_string());

        ExternalIdentity {
            google_id: Some(info.sub),
            email: info.email,
            name,
            avatar_url: info.picture,
            ..Default::default()
        }
    }
}

pub struct GoogleOAuthClient {
    oauth_client: GoogleClient,
    http_client: reqwest::Client,
    userinfo_url: String,
}

impl GoogleOAuthClient {
    pub fn new(settings: &GoogleSettings) -> Result<Self, ConnectorError> {
        let invalid = |err: oauth2::url::ParseError| ConnectorError::Internal(err.to_string());

        let oauth_client = BasicClient::new(ClientId::new(settings.client_id.clone()))
            .set_client_secret(ClientSecret::new(settings.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(settings.auth_url.clone()).map_err(invalid)?)
            .set_token_uri(TokenUrl::new(settings.token_url.clone()).map_err(invalid)?)
            .set_redirect_uri(RedirectUrl::new(settings.redirect_url.clone()).map_err(invalid)?);

        // following redirects on the token endpoint opens SSRF holes
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            oauth_client,
            http_client,
            userinfo_url: settings.userinfo_url.clone(),
        })
    }
}

#[async_trait]
impl GoogleAuthConnector for GoogleOAuthClient {
    fn authorize_url(&self) -> (String, String) {
        let (url, csrf_state) = self
            .oauth_client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .url();

        (url.to_string(), csrf_state.secret().clone())
    }

    #[tracing::instrument(name = "Exchange Google authorization code", skip_all)]
    async fn fetch_identity(&self, code: String) -> Result<ExternalIdentity, ConnectorError> {
        let token = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&self.http_client)
            .await
            .map_err(|err| {
                tracing::warn!("Google code exchange failed: {}", err);
                ConnectorError::Unauthorized(err.to_string())
            })?;

        let response = self
            .http_client
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|err| ConnectorError::ServiceUnavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => ConnectorError::Unauthorized(body),
                _ => ConnectorError::HttpError(format!("{}: {}", status, body)),
            });
        }

        let info: GoogleUserInfo = serde_json::from_str(&body)
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        Ok(info.into())
    }
}
