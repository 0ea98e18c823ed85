use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::services;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Get balance.", skip_all)]
#[get("")]
pub async fn item(user: CurrentUser, pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    let balance = services::balance::get(pg_pool.get_ref(), &user).await?;

    Ok(JsonResponse::build().set_item(balance).ok("OK"))
}

#[tracing::instrument(name = "List transactions.", skip(user, pg_pool))]
#[get("/transactions")]
pub async fn transactions(
    user: CurrentUser,
    filter: web::Query<forms::balance::TransactionFilter>,
    pagination: web::Query<forms::Pagination>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (transactions, total) =
        services::balance::transactions(pg_pool.get_ref(), &user, &filter, &pagination).await?;

    Ok(JsonResponse::build()
        .set_list(transactions)
        .set_meta(pagination.meta(total))
        .ok("OK"))
}
