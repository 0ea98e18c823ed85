use crate::forms::{Pagination, TransactionFilter};
use crate::models::{self, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;

const COLUMNS: &str = "id, user_id, amount, transaction_type, status, payment_id, description, \
                       created_at, updated_at";

pub(crate) async fn insert_in(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    user_id: i32,
    amount: Decimal,
    transaction_type: TransactionType,
    status: TransactionStatus,
    description: Option<&str>,
) -> Result<models::Transaction, sqlx::Error> {
    sqlx::query_as::<_, models::Transaction>(&format!(
        r#"
        INSERT INTO transactions (user_id, amount, transaction_type, status, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(amount)
    .bind(transaction_type)
    .bind(status)
    .bind(description)
    .fetch_one(&mut **tx)
    .await
}

/// Records a deposit awaiting the gateway.
pub async fn insert_pending_deposit(
    pool: &PgPool,
    user_id: i32,
    amount: Decimal,
    description: &str,
) -> Result<models::Transaction, sqlx::Error> {
    let query_span = tracing::info_span!("Saving pending deposit", user_id, %amount);
    let mut tx = pool.begin().await?;
    let transaction = insert_in(
        &mut tx,
        user_id,
        amount,
        TransactionType::Deposit,
        TransactionStatus::Pending,
        Some(description),
    )
    .instrument(query_span)
    .await?;
    tx.commit().await?;
    Ok(transaction)
}

pub async fn set_payment_id(
    pool: &PgPool,
    id: i32,
    payment_id: &str,
) -> Result<models::Transaction, sqlx::Error> {
    sqlx::query_as::<_, models::Transaction>(&format!(
        "UPDATE transactions SET payment_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(payment_id)
    .fetch_one(pool)
    .await
}

pub async fn fetch_by_payment_id(
    pool: &PgPool,
    payment_id: &str,
) -> Result<Option<models::Transaction>, sqlx::Error> {
    sqlx::query_as::<_, models::Transaction>(&format!(
        "SELECT {COLUMNS} FROM transactions WHERE payment_id = $1"
    ))
    .bind(payment_id)
    .fetch_optional(pool)
    .await
}

fn push_filter<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    user_id: i32,
    filter: &TransactionFilter,
) {
    builder.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(transaction_type) = filter.transaction_type {
        builder
            .push(" AND transaction_type = ")
            .push_bind(transaction_type);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
}

pub async fn list(
    pool: &PgPool,
    user_id: i32,
    filter: &TransactionFilter,
    pagination: &Pagination,
) -> Result<(Vec<models::Transaction>, i64), sqlx::Error> {
    let query_span = tracing::info_span!("Listing transactions", user_id);

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM transactions");
    push_filter(&mut count, user_id, filter);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .instrument(query_span.clone())
        .await?;

    let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM transactions"));
    push_filter(&mut select, user_id, filter);
    select
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(pagination.limit())
        .push(" OFFSET ")
        .push_bind(pagination.offset());

    let list = select
        .build_query_as::<models::Transaction>()
        .fetch_all(pool)
        .instrument(query_span)
        .await?;

    Ok((list, total))
}

/// Pending deposits that already have a gateway payment attached.
pub async fn pending_deposits(pool: &PgPool) -> Result<Vec<models::Transaction>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching pending deposits");
    sqlx::query_as::<_, models::Transaction>(&format!(
        r#"
        SELECT {COLUMNS} FROM transactions
        WHERE status = 'PENDING' AND transaction_type = 'DEPOSIT' AND payment_id IS NOT NULL
        ORDER BY created_at ASC
        "#
    ))
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

/// Completes a pending deposit and credits the balance in one transaction.
/// Returns `None` when the deposit is no longer pending, so a payment is
/// credited at most once whichever path gets here first.
pub async fn complete_deposit(
    pool: &PgPool,
    id: i32,
) -> Result<Option<(models::Transaction, models::Balance)>, sqlx::Error> {
    let query_span = tracing::info_span!("Completing deposit", transaction_id = id);
    let mut tx = pool.begin().await?;

    let transaction = sqlx::query_as::<_, models::Transaction>(&format!(
        r#"
        UPDATE transactions SET status = 'COMPLETED', updated_at = NOW()
        WHERE id = $1 AND status = 'PENDING' AND transaction_type = 'DEPOSIT'
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    let transaction = match transaction {
        Some(transaction) => transaction,
        None => {
            tx.rollback().await?;
            return Ok(None);
        }
    };

    let balance = super::balance::credit(&mut tx, transaction.user_id, transaction.amount)
        .instrument(query_span)
        .await?;

    tx.commit().await?;
    Ok(Some((transaction, balance)))
}

/// Moves a pending transaction to a terminal status. Returns whether it changed.
pub async fn close_pending(
    pool: &PgPool,
    id: i32,
    status: TransactionStatus,
) -> Result<bool, sqlx::Error> {
    sqlx::query(
        "UPDATE transactions SET status = $2, updated_at = NOW() WHERE id = $1 AND status = 'PENDING'",
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await
    .map(|result| result.rows_affected() > 0)
}
