use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::{CurrentUser, MaybeUser};
use crate::routes::validated;
use crate::services;
use actix_web::{delete, get, post, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Get build rating.", skip(user, pg_pool))]
#[get("/{id}/rating")]
pub async fn rating_summary(
    path: web::Path<(i32,)>,
    user: MaybeUser,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let summary = services::ratings::summary(pg_pool.get_ref(), path.0, user.as_deref()).await?;

    Ok(JsonResponse::build().set_item(summary).ok("OK"))
}

#[tracing::instrument(name = "Rate build.", skip(user, pg_pool))]
#[post("/{id}/rating")]
pub async fn rating_add(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::rating::RatingForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let rating = services::ratings::create(pg_pool.get_ref(), &user, path.0, form.rating).await?;

    Ok(JsonResponse::build()
        .set_id(rating.id)
        .set_item(rating)
        .created("Rated"))
}

#[tracing::instrument(name = "Change build rating.", skip(user, pg_pool))]
#[put("/{id}/rating")]
pub async fn rating_update(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::rating::RatingForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let rating = services::ratings::update(pg_pool.get_ref(), &user, path.0, form.rating).await?;

    Ok(JsonResponse::build()
        .set_id(rating.id)
        .set_item(rating)
        .ok("Updated"))
}

#[tracing::instrument(name = "Remove build rating.", skip(user, pg_pool))]
#[delete("/{id}/rating")]
pub async fn rating_delete(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    services::ratings::delete(pg_pool.get_ref(), &user, path.0).await?;

    Ok(JsonResponse::<()>::build().ok("Deleted"))
}
