use crate::models;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use tracing::Instrument;

const COLUMNS: &str = "id, user_id, amount, updated_at";

/// Returns the user's balance, creating a zero balance on first access.
pub async fn fetch_or_create(pool: &PgPool, user_id: i32) -> Result<models::Balance, sqlx::Error> {
    let query_span = tracing::info_span!("Fetching balance", user_id);
    sqlx::query(
        "INSERT INTO balances (user_id, amount) VALUES ($1, 0) ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(pool)
    .instrument(query_span.clone())
    .await?;

    sqlx::query_as::<_, models::Balance>(&format!(
        "SELECT {COLUMNS} FROM balances WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub(crate) async fn credit(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    user_id: i32,
    amount: Decimal,
) -> Result<models::Balance, sqlx::Error> {
    sqlx::query_as::<_, models::Balance>(&format!(
        r#"
        INSERT INTO balances (user_id, amount) VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE
        SET amount = balances.amount + EXCLUDED.amount, updated_at = NOW()
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(amount)
    .fetch_one(&mut **tx)
    .await
}

/// Debits the balance and records a completed withdrawal in one transaction.
/// Returns `None` without touching anything when the funds are insufficient.
pub async fn withdraw(
    pool: &PgPool,
    user_id: i32,
    amount: Decimal,
    description: Option<&str>,
) -> Result<Option<(models::Balance, models::Transaction)>, sqlx::Error> {
    let query_span = tracing::info_span!("Withdrawing from balance", user_id, %amount);
    let mut tx = pool.begin().await?;

    let balance = sqlx::query_as::<_, models::Balance>(&format!(
        r#"
        UPDATE balances SET amount = amount - $2, updated_at = NOW()
        WHERE user_id = $1 AND amount >= $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut *tx)
    .instrument(query_span.clone())
    .await?;

    let balance = match balance {
        Some(balance) => balance,
        None => {
            tx.rollback().await?;
            return Ok(None);
        }
    };

    let transaction = super::transaction::insert_in(
        &mut tx,
        user_id,
        amount,
        models::TransactionType::Withdrawal,
        models::TransactionStatus::Completed,
        description,
    )
    .instrument(query_span)
    .await?;

    tx.commit().await?;
    Ok(Some((balance, transaction)))
}
