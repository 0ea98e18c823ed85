use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services;
use actix_web::{put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Update build.", skip(user, pg_pool))]
#[put("/{id}")]
pub async fn update(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::build::BuildForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let detail = services::builds::update(pg_pool.get_ref(), &user, path.0, form).await?;

    Ok(JsonResponse::build()
        .set_id(detail.summary.id)
        .set_item(detail)
        .ok("Updated"))
}
