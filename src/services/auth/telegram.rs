//! Telegram sign-in by polling.
//!
//! The web client mints a token and opens the bot with it; the bot process
//! reports the Telegram account back through a signed request; the client
//! polls until the token resolves into a JWT. The cached record is consumed
//! on the first successful check.

use crate::configuration::TelegramSettings;
use crate::forms::TelegramComplete;
use crate::helpers::{make_token, Cache};
use crate::services::{users, JwtService, ServiceError};
use crate::views::auth::{AccessToken, TelegramCheck, TelegramInit};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;

pub const KEY_PREFIX: &str = "tg_auth:";
const TOKEN_LEN: usize = 32;

pub fn token_key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Handshake {
    Pending {
        created_at: DateTime<Utc>,
    },
    Completed {
        user_id: i32,
        access_token: AccessToken,
    },
}

pub async fn init(
    cache: &dyn Cache,
    settings: &TelegramSettings,
) -> Result<TelegramInit, ServiceError> {
    let token = make_token(TOKEN_LEN);
    cache
        .set_json(
            &token_key(&token),
            &Handshake::Pending {
                created_at: Utc::now(),
            },
            Some(Duration::from_secs(settings.token_ttl_secs)),
        )
        .await?;

    Ok(TelegramInit {
        bot_url: format!("https://t.me/{}?start={}", settings.bot_username, token),
        token,
        expires_in: settings.token_ttl_secs,
    })
}

/// Attaches the Telegram account to a pending handshake.
#[tracing::instrument(name = "Complete Telegram handshake", skip_all, fields(telegram_id = form.telegram_id))]
pub async fn complete(
    pool: &PgPool,
    cache: &dyn Cache,
    jwt: &JwtService,
    settings: &TelegramSettings,
    form: TelegramComplete,
) -> Result<i32, ServiceError> {
    let key = token_key(&form.token);
    match cache.get_json::<Handshake>(&key).await? {
        None => return Err(ServiceError::NotFound("Unknown or expired token".to_string())),
        Some(Handshake::Completed { .. }) => {
            return Err(ServiceError::Conflict(
                "Token is already completed".to_string(),
            ))
        }
        Some(Handshake::Pending { .. }) => {}
    }

    let user = users::upsert_telegram(pool, &form).await?;
    if !user.is_active {
        return Err(ServiceError::Forbidden("Account is disabled".to_string()));
    }

    let access_token = jwt.issue(&user)?;
    cache
        .set_json(
            &key,
            &Handshake::Completed {
                user_id: user.id,
                access_token,
            },
            Some(Duration::from_secs(settings.token_ttl_secs)),
        )
        .await?;

    tracing::info!("Telegram handshake completed for user {}", user.id);
    Ok(user.id)
}

/// Resolves a handshake. A completed handshake is returned exactly once.
pub async fn check(cache: &dyn Cache, token: &str) -> Result<TelegramCheck, ServiceError> {
    let key = token_key(token);
    match cache.get_json::<Handshake>(&key).await? {
        None => Err(ServiceError::NotFound("Unknown or expired token".to_string())),
        Some(Handshake::Pending { .. }) => Ok(TelegramCheck {
            status: "pending".to_string(),
            access_token: None,
            user_id: None,
        }),
        Some(Handshake::Completed {
            user_id,
            access_token,
        }) => {
            // a concurrent check may have consumed it first
            if !cache.delete(&key).await? {
                return Err(ServiceError::NotFound("Unknown or expired token".to_string()));
            }
            Ok(TelegramCheck {
                status: "completed".to_string(),
                access_token: Some(access_token),
                user_id: Some(user_id),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::MemoryCache;

    fn settings() -> TelegramSettings {
        TelegramSettings {
            bot_username: "pcbuilds_bot".to_string(),
            bot_secret: "bot-secret".to_string(),
            token_ttl_secs: 300,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_returns_deep_link() {
        let cache = MemoryCache::new();
        let init = init(&cache, &settings()).await.unwrap();
        assert_eq!(init.token.len(), 32);
        assert_eq!(
            init.bot_url,
            format!("https://t.me/pcbuilds_bot?start={}", init.token)
        );
        assert_eq!(init.expires_in, 300);
    }

    async fn store_completed(cache: &dyn Cache, token: &str, user_id: i32) {
        let handshake = Handshake::Completed {
            user_id,
            access_token: AccessToken {
                access_token: "jwt".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 60,
            },
        };
        cache
            .set_json(&token_key(token), &handshake, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pending_check_keeps_the_token() {
        let cache = MemoryCache::new();
        let init = init(&cache, &settings()).await.unwrap();

        let first = check(&cache, &init.token).await.unwrap();
        assert_eq!(first.status, "pending");
        assert!(first.access_token.is_none());
        let second = check(&cache, &init.token).await.unwrap();
        assert_eq!(second.status, "pending");
    }

    #[tokio::test]
    async fn completed_token_is_consumed_once() {
        let cache = MemoryCache::new();
        let token = "t".repeat(32);
        store_completed(&cache, &token, 3).await;

        let first = check(&cache, &token).await.unwrap();
        assert_eq!(first.status, "completed");
        assert_eq!(first.user_id, Some(3));
        assert!(matches!(
            check(&cache, &token).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let cache = MemoryCache::new();
        assert!(matches!(
            check(&cache, "missing").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn completing_twice_conflicts() {
        let cache = MemoryCache::new();
        let token = "c".repeat(32);
        store_completed(&cache, &token, 1).await;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let jwt = JwtService::new(&crate::configuration::AuthSettings {
            jwt_secret: "secret".to_string(),
            ..Default::default()
        });
        let form = TelegramComplete {
            token,
            telegram_id: 42,
            username: None,
            first_name: Some("Ada".to_string()),
            last_name: None,
        };

        let result = complete(&pool, &cache, &jwt, &settings(), form).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
