use crate::connectors::PaymentGateway;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::services;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;
use std::sync::Arc;

#[tracing::instrument(name = "Top up balance.", skip(user, pg_pool, gateway))]
#[post("/top-up")]
pub async fn top_up(
    user: CurrentUser,
    form: web::Json<forms::balance::AmountForm>,
    pg_pool: web::Data<PgPool>,
    gateway: web::Data<Arc<dyn PaymentGateway>>,
) -> Result<impl Responder> {
    let top_up =
        services::balance::top_up(pg_pool.get_ref(), gateway.get_ref().as_ref(), &user, form.amount)
            .await?;

    Ok(JsonResponse::build()
        .set_id(top_up.transaction.id)
        .set_item(top_up)
        .created("Payment created"))
}
