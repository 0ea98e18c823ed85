use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Add build.", skip(user, pg_pool))]
#[post("")]
pub async fn add(
    user: CurrentUser,
    form: web::Json<forms::build::BuildForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let detail = services::builds::create(pg_pool.get_ref(), &user, form).await?;

    tracing::info!("Build {} created by {}", detail.summary.id, user.id);
    Ok(JsonResponse::build()
        .set_id(detail.summary.id)
        .set_item(detail)
        .created("Build saved"))
}
