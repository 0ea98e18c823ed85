use crate::forms;
use crate::helpers::JsonResponse;
use crate::middleware::guard::CurrentUser;
use crate::services;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;

#[derive(Debug, serde::Serialize)]
struct Withdrawal {
    balance: crate::models::Balance,
    transaction: crate::models::Transaction,
}

#[tracing::instrument(name = "Withdraw from balance.", skip(user, pg_pool))]
#[post("/withdraw")]
pub async fn withdraw(
    user: CurrentUser,
    form: web::Json<forms::balance::AmountForm>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let (balance, transaction) =
        services::balance::withdraw(pg_pool.get_ref(), &user, form.amount).await?;

    Ok(JsonResponse::build()
        .set_id(transaction.id)
        .set_item(Withdrawal {
            balance,
            transaction,
        })
        .ok("Withdrawn"))
}
