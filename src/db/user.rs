use crate::forms::{Pagination, UserFilter};
use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const COLUMNS: &str = "id, email, name, avatar_url, google_id, telegram_id, telegram_username, \
                       role, is_active, created_at, updated_at";

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::User>, sqlx::Error> {
    tracing::debug!("Fetching user by id: {}", id);
    sqlx::query_as::<_, models::User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_google_id(
    pool: &PgPool,
    google_id: &str,
) -> Result<Option<models::User>, sqlx::Error> {
    sqlx::query_as::<_, models::User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE google_id = $1"
    ))
    .bind(google_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_telegram_id(
    pool: &PgPool,
    telegram_id: i64,
) -> Result<Option<models::User>, sqlx::Error> {
    sqlx::query_as::<_, models::User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE telegram_id = $1"
    ))
    .bind(telegram_id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_email(pool: &PgPool, email: &str) -> Result<Option<models::User>, sqlx::Error> {
    sqlx::query_as::<_, models::User>(&format!(
        "SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn insert(pool: &PgPool, user: &models::User) -> Result<models::User, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new user into the database");
    sqlx::query_as::<_, models::User>(&format!(
        r#"
        INSERT INTO users (email, name, avatar_url, google_id, telegram_id, telegram_username, role, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.avatar_url)
    .bind(&user.google_id)
    .bind(user.telegram_id)
    .bind(&user.telegram_username)
    .bind(user.role)
    .bind(user.is_active)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn update(pool: &PgPool, user: &models::User) -> Result<models::User, sqlx::Error> {
    let query_span = tracing::info_span!("Updating user", user_id = user.id);
    sqlx::query_as::<_, models::User>(&format!(
        r#"
        UPDATE users
        SET email = $2, name = $3, avatar_url = $4, google_id = $5, telegram_id = $6,
            telegram_username = $7, role = $8, is_active = $9, updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.avatar_url)
    .bind(&user.google_id)
    .bind(user.telegram_id)
    .bind(&user.telegram_username)
    .bind(user.role)
    .bind(user.is_active)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

fn push_filter<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a UserFilter) {
    builder.push(" WHERE TRUE");
    if let Some(role) = filter.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = super::like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &UserFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::User>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing users");

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filter(&mut count, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM users"));
    push_filter(&mut select, filter);
    select
        .push(" ORDER BY id ASC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let users = select
        .build_query_as::<models::User>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((users, total))
}
