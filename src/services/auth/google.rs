use crate::connectors::GoogleAuthConnector;
use crate::forms::GoogleCallback;
use crate::helpers::Cache;
use crate::services::{users, JwtService, ServiceError};
use crate::views::auth::{GoogleLogin, Session};
use sqlx::PgPool;
use std::time::Duration;

const STATE_TTL: Duration = Duration::from_secs(600);

fn state_key(state: &str) -> String {
    format!("oauth_state:{state}")
}

#[tracing::instrument(name = "Google login", skip_all)]
pub async fn login(
    cache: &dyn Cache,
    google: &dyn GoogleAuthConnector,
) -> Result<GoogleLogin, ServiceError> {
    let (authorize_url, state) = google.authorize_url();
    cache
        .set(&state_key(&state), "1".to_string(), Some(STATE_TTL))
        .await?;

    Ok(GoogleLogin {
        authorize_url,
        state,
    })
}

#[tracing::instrument(name = "Google callback", skip_all)]
pub async fn callback(
    pool: &PgPool,
    cache: &dyn Cache,
    google: &dyn GoogleAuthConnector,
    jwt: &JwtService,
    form: GoogleCallback,
) -> Result<Session, ServiceError> {
    if !cache.delete(&state_key(&form.state)).await? {
        return Err(ServiceError::Validation(
            "Unknown or expired OAuth state".to_string(),
        ));
    }

    let identity = google.fetch_identity(form.code).await?;
    let user = users::upsert_google(pool, identity).await?;
    if !user.is_active {
        return Err(ServiceError::Forbidden("Account is disabled".to_string()));
    }

    let token = jwt.issue(&user)?;
    tracing::info!("User {} signed in with Google", user.id);
    Ok(Session { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::google::MockGoogleConnector;
    use crate::helpers::MemoryCache;

    #[tokio::test]
    async fn login_stores_state_for_callback() {
        let cache = MemoryCache::new();
        let login = login(&cache, &MockGoogleConnector).await.unwrap();
        assert_eq!(login.state, "mock-state");
        assert!(cache.get("oauth_state:mock-state").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn callback_with_unknown_state_is_rejected() {
        let cache = MemoryCache::new();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let jwt = JwtService::new(&crate::configuration::AuthSettings {
            jwt_secret: "secret".to_string(),
            ..Default::default()
        });

        let result = callback(
            &pool,
            &cache,
            &MockGoogleConnector,
            &jwt,
            GoogleCallback {
                code: "abc".to_string(),
                state: "forged".to_string(),
            },
        )
        .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }
}
