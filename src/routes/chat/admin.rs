use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::AdminUser;
use crate::services;
use actix_web::{get, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Admin list chats.", skip(_admin, pg_pool))]
#[get("")]
pub async fn admin_list(
    _admin: AdminUser,
    filter: web::Query<forms::chat::ChatFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (chats, total) = services::chats::list_all(pg_pool.get_ref(), &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(chats)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Admin set chat status.", skip(admin, pg_pool))]
#[put("/{id}/status")]
pub async fn admin_set_status(
    admin: AdminUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::chat::ChangeStatus>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let chat = services::chats::set_status(pg_pool.get_ref(), &admin, path.0, form.status).await?;

    Ok(JsonResponse::build().set_id(chat.id).set_item(chat).ok("Status changed"))
}
