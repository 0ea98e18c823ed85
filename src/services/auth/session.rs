use crate::db;
use crate::helpers::Cache;
use crate::models::User;
use crate::services::ServiceError;
use sqlx::PgPool;
use std::time::Duration;

pub fn cache_key(user_id: i32) -> String {
    format!("session:user:{user_id}")
}

/// Loads the user behind a session, preferring the cached copy.
pub async fn load_user(
    pool: &PgPool,
    cache: &dyn Cache,
    ttl: Duration,
    user_id: i32,
) -> Result<Option<User>, ServiceError> {
    let key = cache_key(user_id);
    match cache.get_json::<User>(&key).await {
        Ok(Some(user)) => return Ok(Some(user)),
        Ok(None) => {}
        Err(err) => tracing::warn!("Session cache read failed: {}", err),
    }

    let user = db::user::fetch(pool, user_id).await?;
    if let Some(user) = &user {
        if let Err(err) = cache.set_json(&key, user, Some(ttl)).await {
            tracing::warn!("Session cache write failed: {}", err);
        }
    }

    Ok(user)
}

/// Drops the cached copy so the next request sees fresh role and status.
pub async fn invalidate(cache: &dyn Cache, user_id: i32) {
    if let Err(err) = cache.delete(&cache_key(user_id)).await {
        tracing::warn!("Session cache invalidation failed: {}", err);
    }
}
