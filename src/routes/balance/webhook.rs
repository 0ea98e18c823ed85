use crate::connectors::PaymentGateway;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::services::{self, Notifier};
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Payment gateway notification.", skip(pg_pool, gateway, notifier))]
#[post("/webhook")]
pub async fn webhook(
    form: web::Json<forms::balance::PaymentNotification>,
    pg_pool: web::Data<PgPool>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
    notifier: web::Data<Notifier>,
) -> Result<impl Responder> {
    services::balance::handle_notification(
        pg_pool.get_ref(),
        gateway.get_ref().as_ref(),
        notifier.get_ref(),
        form.into_inner(),
    )
    .await?;

    Ok(JsonResponse::<()>::build().ok("Accepted"))
}
