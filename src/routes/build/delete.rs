use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::services;
use actix_web::{delete, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Delete build.", skip(user, pg_pool))]
#[delete("/{id}")]
pub async fn delete(
    user: CurrentUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    services::builds::delete(pg_pool.get_ref(), &user, path.0).await?;

    Ok(JsonResponse::<()>::build().set_id(path.0).ok("Deleted"))
}
