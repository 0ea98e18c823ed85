use crate::db;
use crate::forms::{ChatFilter, NewChat, Pagination};
use crate::models::{Chat, ChatStatus, Message, User};
use crate::services::{Notifier, ServiceError};
use crate::views::chat::ChatDetail;
use sqlx::PgPool;

async fn fetch_for(pool: &PgPool, user: &User, id: i32) -> Result<Chat, ServiceError> {
    let chat = db::chat::fetch(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Chat"))?;

    if !chat.is_participant(user) {
        return Err(ServiceError::Forbidden("Not your chat".to_string()));
    }

    Ok(chat)
}

pub async fn open(pool: &PgPool, user: &User, form: NewChat) -> Result<ChatDetail, ServiceError> {
    let (chat, message) = db::chat::insert(pool, user.id, form.subject.trim(), &form.text).await?;
    tracing::info!("User {} opened chat {}", user.id, chat.id);
    Ok(ChatDetail {
        chat,
        messages: vec![message],
    })
}

pub async fn list_mine(
    pool: &PgPool,
    user: &User,
    pagination: &Pagination,
) -> Result<(Vec<Chat>, i64), ServiceError> {
    Ok(db::chat::list(pool, Some(user.id), &ChatFilter::default(), pagination).await?)
}

pub async fn list_all(
    pool: &PgPool,
    filter: &ChatFilter,
    pagination: &Pagination,
) -> Result<(Vec<Chat>, i64), ServiceError> {
    Ok(db::chat::list(pool, None, filter, pagination).await?)
}

/// Returns the thread and marks the other side's messages as read.
pub async fn get(pool: &PgPool, user: &User, id: i32) -> Result<ChatDetail, ServiceError> {
    let chat = fetch_for(pool, user, id).await?;
    db::chat::mark_read(pool, chat.id, user.id).await?;
    let messages = db::chat::messages(pool, chat.id).await?;
    Ok(ChatDetail { chat, messages })
}

pub async fn post_message(
    pool: &PgPool,
    notifier: &Notifier,
    user: &User,
    id: i32,
    text: &str,
) -> Result<Message, ServiceError> {
    let chat = fetch_for(pool, user, id).await?;
    if chat.status == ChatStatus::Closed {
        return Err(ServiceError::Conflict("Chat is closed".to_string()));
    }

    let message = db::chat::insert_message(pool, chat.id, user.id, text).await?;

    let staff_reply = user.is_admin() && chat.user_id != user.id;
    if staff_reply {
        if chat.status == ChatStatus::Open {
            db::chat::update_status(pool, chat.id, ChatStatus::InProgress, Some(user.id)).await?;
        }

        if let Some(owner) = db::user::fetch(pool, chat.user_id).await? {
            notifier.send(
                owner.email.as_deref(),
                format!("New reply in \"{}\"", chat.subject),
                format!(
                    "Hello {},\n\nSupport replied to your chat \"{}\":\n\n{}\n",
                    owner.name, chat.subject, text
                ),
            );
        }
    }

    Ok(message)
}

pub async fn close(pool: &PgPool, user: &User, id: i32) -> Result<Chat, ServiceError> {
    let chat = fetch_for(pool, user, id).await?;
    if chat.status == ChatStatus::Closed {
        return Ok(chat);
    }
    Ok(db::chat::update_status(pool, chat.id, ChatStatus::Closed, None).await?)
}

pub async fn set_status(
    pool: &PgPool,
    admin: &User,
    id: i32,
    status: ChatStatus,
) -> Result<Chat, ServiceError> {
    let chat = fetch_for(pool, admin, id).await?;
    let assignee = (status != ChatStatus::Open).then_some(admin.id);
    Ok(db::chat::update_status(pool, chat.id, status, assignee).await?)
}
