use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services::{self, Notifier};
use actix_web::{get, post, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Open chat.", skip_all)]
#[post("")]
pub async fn add(
    user: CurrentUser,
    form: web::Json<forms::chat::NewChat>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let chat = services::chats::open(pg_pool.get_ref(), &user, form).await?;

    Ok(JsonResponse::build()
        .set_id(chat.chat.id)
        .set_item(chat)
        .created("Chat opened"))
}

#[tracing::instrument(name = "List own chats.", skip(user, pg_pool))]
#[get("")]
pub async fn list(
    user: CurrentUser,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (chats, total) = services::chats::list_mine(pg_pool.get_ref(), &user, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(chats)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get chat.", skip(user, pg_pool))]
#[get("/{id}")]
pub async fn item(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let chat = services::chats::get(pg_pool.get_ref(), &user, path.0).await?;

    Ok(JsonResponse::build()
        .set_id(chat.chat.id)
        .set_item(chat)
        .ok("OK"))
}

#[tracing::instrument(name = "Post chat message.", skip(user, form, pg_pool, notifier))]
#[post("/{id}/messages")]
pub async fn add_message(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::chat::NewMessage>,
    pg_pool: web::Data<PgPool>,
    notifier: web::Data<Notifier>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let message =
        services::chats::post_message(pg_pool.get_ref(), &notifier, &user, path.0, &form.text)
            .await?;

    Ok(JsonResponse::build()
        .set_id(message.id)
        .set_item(message)
        .created("Message sent"))
}

#[tracing::instrument(name = "Close chat.", skip(user, pg_pool))]
#[post("/{id}/close")]
pub async fn close(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let chat = services::chats::close(pg_pool.get_ref(), &user, path.0).await?;

    Ok(JsonResponse::build().set_id(chat.id).set_item(chat).ok("Closed"))
}
