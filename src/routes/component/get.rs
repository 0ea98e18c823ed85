use crate::forms;
use crate::helpers::JsonResponse;
use crate::services;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "List components.", skip(pg_pool))]
#[get("")]
pub async fn list(
    filter: web::Query<forms::component::ComponentFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (components, total) =
        services::components::list(pg_pool.get_ref(), &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(components)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "List component categories.", skip(pg_pool))]
#[get("/categories")]
pub async fn categories(pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let categories = services::components::categories(pg_pool.get_ref()).await?;

    Ok(JsonResponse::build().set_list(categories).ok("OK"))
}

#[tracing::instrument(name = "Get component.", skip(pg_pool))]
#[get("/{id}")]
pub async fn item(path: web::Path<(i32,)>, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let component = services::components::get(pg_pool.get_ref(), path.0).await?;

    Ok(JsonResponse::build()
        .set_id(component.id)
        .set_item(component)
        .ok("OK"))
}
