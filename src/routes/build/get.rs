use crate::forms;
use crate::helpers::{Cache, JsonResponse};
use crate::middleware::guard::{CurrentUser, MaybeUser};
use crate::services;
use actix_web::{get, web, HttpRequest, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "List builds.", skip(pg_pool))]
#[get("")]
pub async fn list(
    filter: web::Query<forms::build::BuildFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (builds, total) = services::builds::list(pg_pool.get_ref(), &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(builds)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "List own builds.", skip(user, pg_pool))]
#[get("/my")]
pub async fn my_list(
    user: CurrentUser,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (builds, total) = services::builds::list_mine(pg_pool.get_ref(), &user, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(builds)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Get build.", skip(req, user, pg_pool, cache))]
#[get("/{id}")]
pub async fn item(
    req: HttpRequest,
    path: web::Path<(i32,)>,
    user: MaybeUser,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
) -> Result<impl Responder> {
    let connection = req.connection_info();
    let detail = services::builds::view(
        pg_pool.get_ref(),
        cache.get_ref().as_ref(),
        path.0,
        user.as_deref(),
        connection.realip_remote_addr(),
    )
    .await?;

    Ok(JsonResponse::build()
        .set_id(detail.summary.id)
        .set_item(detail)
        .ok("OK"))
}
