use crate::forms;
use crate::helpers::{Cache, JsonResponse};
use crate::middleware::guard::CurrentUser;
use crate::routes::validated;
use crate::services;
use actix_web::{put, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Update own profile.", skip_all)]
#[put("/me")]
pub async fn update_me(
    user: CurrentUser,
    form: web::Json<forms::user::UpdateProfile>,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let user =
        services::users::update_profile(pg_pool.get_ref(), cache.get_ref().as_ref(), &user, form)
            .await?;

    Ok(JsonResponse::build().set_id(user.id).set_item(user).ok("Updated"))
}
