use crate::configuration::Settings;
use crate::forms;
use crate::helpers::{Cache, JsonResponse};
use crate::middleware::guard::SignedByBot;
use crate::routes::validated;
use crate::services::{self, JwtService};
use actix_web::{get, post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Telegram login init.", skip_all)]
#[post("/telegram/init")]
pub async fn telegram_init_handler(
    cache: web::Data<Arc<dyn Cache>>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let init = services::auth::telegram::init(cache.get_ref().as_ref(), &settings.telegram).await?;

    Ok(JsonResponse::build().set_item(init).ok("OK"))
}

#[tracing::instrument(name = "Telegram login complete.", skip_all)]
#[post("/telegram/complete")]
pub async fn telegram_complete_handler(
    _bot: SignedByBot,
    form: web::Json<forms::auth::TelegramComplete>,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
    jwt: web::Data<JwtService>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let form = validated(form)?;
    let user_id = services::auth::telegram::complete(
        pg_pool.get_ref(),
        cache.get_ref().as_ref(),
        jwt.get_ref(),
        &settings.telegram,
        form,
    )
    .await?;

    Ok(JsonResponse::<()>::build().set_id(user_id).ok("Completed"))
}

#[tracing::instrument(name = "Telegram login check.", skip(cache))]
#[get("/telegram/check/{token}")]
pub async fn telegram_check_handler(
    path: web::Path<(String,)>,
    cache: web::Data<Arc<dyn Cache>>,
) -> Result<impl Responder> {
    let check = services::auth::telegram::check(cache.get_ref().as_ref(), &path.0).await?;

    Ok(JsonResponse::build().set_item(check).ok("OK"))
}
