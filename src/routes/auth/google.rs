use crate::connectors::GoogleAuthConnector;
use crate::forms;
use crate::helpers::{Cache, JsonResponse};
use crate::services::{self, JwtService};
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Google login.", skip_all)]
#[get("/google/login")]
pub async fn google_login_handler(
    cache: web::Data<Arc<dyn Cache>>,
    google: web::Data<Arc<dyn GoogleAuthConnector>>,
) -> Result<impl Responder> {
    let login = services::auth::google::login(cache.get_ref().as_ref(), google.get_ref().as_ref())
        .await?;

    Ok(JsonResponse::build().set_item(login).ok("OK"))
}

#[tracing::instrument(name = "Google callback.", skip_all)]
#[get("/google/callback")]
pub async fn google_callback_handler(
    query: web::Query<forms::auth::GoogleCallback>,
    pg_pool: web::Data<PgPool>,
    cache: web::Data<Arc<dyn Cache>>,
    google: web::Data<Arc<dyn GoogleAuthConnector>>,
    jwt: web::Data<JwtService>,
) -> Result<impl Responder> {
    let session = services::auth::google::callback(
        pg_pool.get_ref(),
        cache.get_ref().as_ref(),
        google.get_ref().as_ref(),
        jwt.get_ref(),
        query.into_inner(),
    )
    .await?;

    tracing::info!("User {} signed in with Google", session.user.id);
    Ok(JsonResponse::build()
        .set_id(session.user.id)
        .set_item(session)
        .ok("Signed in"))
}
