use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::AdminUser;
use crate::routes::validated;
use crate::services::{self, Notifier};
use actix_web::{get, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Admin list feedback.", skip(_admin, pg_pool))]
#[get("")]
pub async fn admin_list(
    _admin: AdminUser,
    filter: web::Query<forms::feedback::FeedbackFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (feedback, total) = services::feedback::list(pg_pool.get_ref(), &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(feedback)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}

#[tracing::instrument(name = "Admin feedback stats.", skip_all)]
#[get("/stats")]
pub async fn admin_stats(_admin: AdminUser, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let stats = services::feedback::stats(pg_pool.get_ref()).await?;

    Ok(JsonResponse::build().set_item(stats).ok("OK"))
}

#[tracing::instrument(name = "Admin get feedback.", skip(_admin, pg_pool))]
#[get("/{id}")]
pub async fn admin_item(
    _admin: AdminUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let feedback = services::feedback::get(pg_pool.get_ref(), path.0).await?;

    Ok(JsonResponse::build()
        .set_id(feedback.id)
        .set_item(feedback)
        .ok("OK"))
}

#[tracing::instrument(name = "Admin review feedback.", skip(admin, form, pg_pool, notifier))]
#[put("/{id}")]
pub async fn admin_update(
    admin: AdminUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::feedback::AdminEditFeedback>,
    pg_pool: web::Data<PgPool>,
    notifier: web::Data<Notifier>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let feedback =
        services::feedback::review(pg_pool.get_ref(), notifier.get_ref(), path.0, form).await?;

    tracing::info!("Feedback {} reviewed by {}", feedback.id, admin.id);
    Ok(JsonResponse::build()
        .set_id(feedback.id)
        .set_item(feedback)
        .ok("Updated"))
}
