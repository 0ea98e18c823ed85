use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services;
use actix_web::{delete, get, post, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Leave feedback.", skip_all)]
#[post("")]
pub async fn add(
    user: CurrentUser,
    form: web::Json<forms::feedback::NewFeedback>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let feedback = services::feedback::create(pg_pool.get_ref(), &user, form).await?;

    Ok(JsonResponse::build()
        .set_id(feedback.id)
        .set_item(feedback)
        .created("Thank you for the feedback"))
}

#[tracing::instrument(name = "Get own feedback.", skip_all)]
#[get("/my")]
pub async fn my_item(user: CurrentUser, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let feedback = services::feedback::get_mine(pg_pool.get_ref(), &user).await?;

    Ok(JsonResponse::build()
        .set_id(feedback.id)
        .set_item(feedback)
        .ok("OK"))
}

#[tracing::instrument(name = "Edit own feedback.", skip_all)]
#[put("/my")]
pub async fn my_update(
    user: CurrentUser,
    form: web::Json<forms::feedback::UserEditFeedback>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let feedback = services::feedback::update_mine(pg_pool.get_ref(), &user, form).await?;

    Ok(JsonResponse::build()
        .set_id(feedback.id)
        .set_item(feedback)
        .ok("Updated"))
}

#[tracing::instrument(name = "Delete own feedback.", skip_all)]
#[delete("/my")]
pub async fn my_delete(user: CurrentUser, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    services::feedback::delete_mine(pg_pool.get_ref(), &user).await?;

    Ok(JsonResponse::<()>::build().ok("Deleted"))
}
