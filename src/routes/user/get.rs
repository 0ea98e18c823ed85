use crate::helpers::JsonResponse;
use crate::services;
use crate::views;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Get public profile.", skip(pg_pool))]
#[get("/{id}")]
pub async fn item(path: web::Path<(i32,)>, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let user = services::users::get(pg_pool.get_ref(), path.0).await?;
    let profile: views::user::Public = user.into();

    Ok(JsonResponse::build()
        .set_id(profile.id)
        .set_item(profile)
        .ok("OK"))
}
