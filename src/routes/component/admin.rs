use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::AdminUser;
use crate::routes::validated;
use crate::services;
use actix_web::{delete, post, put, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Admin add component.", skip(_admin, pg_pool))]
#[post("")]
pub async fn admin_add(
    _admin: AdminUser,
    form: web::Json<forms::component::NewComponent>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let component = services::components::create(pg_pool.get_ref(), form).await?;

    Ok(JsonResponse::build()
        .set_id(component.id)
        .set_item(component)
        .created("Component added"))
}

#[tracing::instrument(name = "Admin update component.", skip(_admin, pg_pool))]
#[put("/{id}")]
pub async fn admin_update(
    _admin: AdminUser,
    path: web::Path<(i32,)>,
    form: web::Json<forms::component::EditComponent>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let component = services::components::update(pg_pool.get_ref(), path.0, form).await?;

    Ok(JsonResponse::build()
        .set_id(component.id)
        .set_item(component)
        .ok("Updated"))
}

#[tracing::instrument(name = "Admin delete component.", skip(_admin, pg_pool))]
#[delete("/{id}")]
pub async fn admin_delete(
    _admin: AdminUser,
    path: web::Path<(i32,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    services::components::delete(pg_pool.get_ref(), path.0).await?;

    Ok(JsonResponse::<()>::build().set_id(path.0).ok("Deleted"))
}
