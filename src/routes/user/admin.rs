use crate::forms;
use crate::helpers::{Cache, JsonResponse};
use crate::middleware::guard::{AdminUser, SuperAdminUser};
use crate::services;
use actix_web::{get, put, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Admin list users.", skip(_admin, pg_pool))]
#[get("")]
pub async fn admin_list(
    _admin: AdminUser,
    filter: web::Query<forms::user::UserFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (users, total) = services::users::list(pg_pool.get_ref(), &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(users)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Admin change user role.", skip(actor, pg_pool, cache))]
#[put("/{id}/role")]
pub async fn admin_change_role(
    actor: SuperAdminUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::user::ChangeRole>,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
) -> Result<impl Responder> {
    let user = services::users::change_role(
        pg_pool.get_ref(),
        cache.get_ref().as_ref(),
        &actor,
        path.0,
        form.role,
    )
    .await?;

    tracing::info!("User {} is now {} (by {})", user.id, user.role, actor.id);
    Ok(JsonResponse::build().set_id(user.id).set_item(user).ok("Role changed"))
}

#[tracing::instrument(name = "Admin change user activity.", skip(actor, pg_pool, cache))]
#[put("/{id}/active")]
pub async fn admin_change_active(
    actor: SuperAdminUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::user::ChangeActive>,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
) -> Result<impl Responder> {
    let user = services::users::change_active(
        pg_pool.get_ref(),
        cache.get_ref().as_ref(),
        &actor,
        path.0,
        form.is_active,
    )
    .await?;

    let message = if user.is_active { "Activated" } else { "Deactivated" };
    Ok(JsonResponse::build().set_id(user.id).set_item(user).ok(message))
}
