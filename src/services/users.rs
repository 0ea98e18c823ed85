use crate::db;
use crate::forms::{Pagination, TelegramComplete, UpdateProfile, UserFilter};
use crate::helpers::Cache;
use crate::models::{ExternalIdentity, Role, User};
use crate::services::{auth::session, ServiceError};
use sqlx::PgPool;

/// Finds the user by Google id, links an existing account with the same email,
/// or registers a new one.
pub async fn upsert_google(pool: &PgPool, identity: ExternalIdentity) -> Result<User, ServiceError> {
    let google_id = identity
        .google_id
        .clone()
        .ok_or_else(|| ServiceError::External("Google identity without subject".to_string()))?;

    if let Some(mut user) = db::user::fetch_by_google_id(pool, &google_id).await? {
        if user.avatar_url.is_none() && identity.avatar_url.is_some() {
            user.avatar_url = identity.avatar_url;
            return Ok(db::user::update(pool, &user).await?);
        }
        return Ok(user);
    }

    if let Some(email) = identity.email.as_deref() {
        if let Some(mut user) = db::user::fetch_by_email(pool, email).await? {
            tracing::info!("Linking Google account to existing user {}", user.id);
            user.google_id = Some(google_id);
            if user.avatar_url.is_none() {
                user.avatar_url = identity.avatar_url;
            }
            return Ok(db::user::update(pool, &user).await?);
        }
    }

    register(pool, identity).await
}

fn telegram_identity(form: &TelegramComplete) -> ExternalIdentity {
    ExternalIdentity {
        telegram_id: Some(form.telegram_id),
        telegram_username: form.username.clone(),
        name: form.display_name(),
        ..Default::default()
    }
}

pub async fn upsert_telegram(pool: &PgPool, form: &TelegramComplete) -> Result<User, ServiceError> {
    let identity = telegram_identity(form);

    match db::user::fetch_by_telegram_id(pool, form.telegram_id).await? {
        Some(mut user) => {
            if user.telegram_username != identity.telegram_username {
                user.telegram_username = identity.telegram_username;
                return Ok(db::user::update(pool, &user).await?);
            }
            Ok(user)
        }
        None => register(pool, identity).await,
    }
}

async fn register(pool: &PgPool, identity: ExternalIdentity) -> Result<User, ServiceError> {
    let user = User {
        email: identity.email,
        name: identity.name,
        avatar_url: identity.avatar_url,
        google_id: identity.google_id,
        telegram_id: identity.telegram_id,
        telegram_username: identity.telegram_username,
        role: Role::User,
        is_active: true,
        ..Default::default()
    };

    let user = db::user::insert(pool, &user).await?;
    tracing::info!("Registered user {}", user.id);
    Ok(user)
}

pub async fn get(pool: &PgPool, id: i32) -> Result<User, ServiceError> {
    db::user::fetch(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))
}

pub async fn update_profile(
    pool: &PgPool,
    cache: &dyn Cache,
    user: &User,
    form: UpdateProfile,
) -> Result<User, ServiceError> {
    let mut user = user.clone();
    form.update(&mut user);
    let user = db::user::update(pool, &user).await?;
    session::invalidate(cache, user.id).await;
    Ok(user)
}

pub async fn list(
    pool: &PgPool,
    filter: &UserFilter,
    pagination: &Pagination,
) -> Result<(Vec<User>, i64), ServiceError> {
    Ok(db::user::list(pool, filter, pagination).await?)
}

/// Super admins manage USER and ADMIN roles of other accounts.
pub fn check_role_change(actor: &User, target_id: i32, role: Role) -> Result<(), ServiceError> {
    if actor.role != Role::SuperAdmin {
        return Err(ServiceError::Forbidden(
            "Only a super admin can change roles".to_string(),
        ));
    }
    if actor.id == target_id {
        return Err(ServiceError::Forbidden(
            "You can't change your own role".to_string(),
        ));
    }
    if role == Role::SuperAdmin {
        return Err(ServiceError::Validation(
            "Role must be USER or ADMIN".to_string(),
        ));
    }
    Ok(())
}

pub async fn change_role(
    pool: &PgPool,
    cache: &dyn Cache,
    actor: &User,
    target_id: i32,
    role: Role,
) -> Result<User, ServiceError> {
    check_role_change(actor, target_id, role)?;

    let mut target = get(pool, target_id).await?;
    if target.role == Role::SuperAdmin {
        return Err(ServiceError::Forbidden(
            "A super admin's role can't be changed".to_string(),
        ));
    }
    target.role = role;
    let target = db::user::update(pool, &target).await?;
    session::invalidate(cache, target.id).await;

    tracing::info!("User {} set role of {} to {}", actor.id, target.id, role);
    Ok(target)
}

pub async fn change_active(
    pool: &PgPool,
    cache: &dyn Cache,
    actor: &User,
    target_id: i32,
    is_active: bool,
) -> Result<User, ServiceError> {
    if actor.id == target_id {
        return Err(ServiceError::Forbidden(
            "You can't deactivate yourself".to_string(),
        ));
    }

    let mut target = get(pool, target_id).await?;
    if target.role == Role::SuperAdmin {
        return Err(ServiceError::Forbidden(
            "A super admin can't be deactivated".to_string(),
        ));
    }
    target.is_active = is_active;
    let target = db::user::update(pool, &target).await?;
    session::invalidate(cache, target.id).await;
    Ok(target)
}
