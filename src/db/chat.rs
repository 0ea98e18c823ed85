use crate::forms::{ChatFilter, Pagination};
use crate::models;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const CHAT_COLUMNS: &str = "id, user_id, admin_id, subject, status, created_at, updated_at";
const MESSAGE_COLUMNS: &str = "id, chat_id, sender_id, text, is_read, created_at";

/// Opens a chat together with its first message.
pub async fn insert(
    pool: &PgPool,
    user_id: i32,
    subject: &str,
    text: &str,
) -> Result<(models::Chat, models::Message), sqlx::Error> {
    let query_span = tracing::info_span!("Opening a new chat", user_id);
    let mut tx = pool.begin().await?;

    let chat = sqlx::query_as::<_, models::Chat>(&format!(
        "INSERT INTO chats (user_id, subject, status) VALUES ($1, $2, 'OPEN') RETURNING {CHAT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(subject)
    .fetch_one(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    let message = sqlx::query_as::<_, models::Message>(&format!(
        "INSERT INTO messages (chat_id, sender_id, text) VALUES ($1, $2, $3) RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(chat.id)
    .bind(user_id)
    .bind(text)
    .fetch_one(&mut *tx)
    .instrument(query_span)
    .await?;

    tx.commit().await?;
    Ok((chat, message))
}

pub async fn fetch(pool: &PgPool, id: i32) -> Result<Option<models::Chat>, sqlx::Error> {
    sqlx::query_as::<_, models::Chat>(&format!("SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

fn push_filter<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    user_id: Option<i32>,
    filter: &ChatFilter,
) {
    builder.push(" WHERE TRUE");
    if let Some(user_id) = user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
}

/// Chats ordered by latest activity. `user_id` limits the list to one owner.
pub async fn list(
    pool: &PgPool,
    user_id: Option<i32>,
    filter: &ChatFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::Chat>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing chats");

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM chats");
    push_filter(&mut count, user_id, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(format!("SELECT {CHAT_COLUMNS} FROM chats"));
    push_filter(&mut select, user_id, filter);
    select
        .push(" ORDER BY updated_at DESC, id DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let chats = select
        .build_query_as::<models::Chat>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((chats, total))
}

pub async fn update_status(
    pool: &PgPool,
    id: i32,
    status: models::ChatStatus,
    admin_id: Option<i32>,
) -> Result<models::Chat, sqlx::Error> {
    let query_span = tracing::info_span!("Updating chat status", chat_id = id);
    sqlx::query_as::<_, models::Chat>(&format!(
        r#"
        UPDATE chats
        SET status = $2, admin_id = COALESCE($3, admin_id), updated_at = NOW()
        WHERE id = $1
        RETURNING {CHAT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .bind(admin_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn messages(pool: &PgPool, chat_id: i32) -> Result<Vec<models::Message>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching chat messages", chat_id);
    sqlx::query_as::<_, models::Message>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = $1 ORDER BY created_at ASC, id ASC"
    ))
    .bind(chat_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

/// Adds a message and bumps the chat's activity timestamp.
pub async fn insert_message(
    pool: &PgPool,
    chat_id: i32,
    sender_id: i32,
    text: &str,
) -> Result<models::Message, sqlx::Error> {
    let query_span = tracing::info_span!("Saving chat message", chat_id, sender_id);
    let mut tx = pool.begin().await?;

    let message = sqlx::query_as::<_, models::Message>(&format!(
        "INSERT INTO messages (chat_id, sender_id, text) VALUES ($1, $2, $3) RETURNING {MESSAGE_COLUMNS}"
    ))
    .bind(chat_id)
    .bind(sender_id)
    .bind(text)
    .fetch_one(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    sqlx::query("UPDATE chats SET updated_at = NOW() WHERE id = $1")
        .bind(chat_id)
        .execute(&mut *tx)
        .instrument(query_span)
        .await?;

    tx.commit().await?;
    Ok(message)
}

/// Marks messages written by anyone but `reader_id` as read.
pub async fn mark_read(pool: &PgPool, chat_id: i32, reader_id: i32) -> Result<u64, sqlx::Error> {
    sqlx::query("UPDATE messages SET is_read = TRUE WHERE chat_id = $1 AND sender_id <> $2 AND NOT is_read")
        .bind(chat_id)
        .bind(reader_id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
}
