use crate::connectors::{CreatePayment, GatewayPaymentStatus, PaymentGateway};
use crate::db;
use crate::forms::{Pagination, PaymentNotification, TransactionFilter};
use crate::models::{Balance, Transaction, TransactionStatus, User};
use crate::services::{Notifier, ServiceError};
use crate::views::balance::TopUp;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

const MAX_AMOUNT: i64 = 1_000_000;

/// Positive, at most two decimal places, capped per operation.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, ServiceError> {
    if amount <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Amount must be positive".to_string(),
        ));
    }
    if amount.normalize().scale() > 2 {
        return Err(ServiceError::Validation(
            "Amount can't have more than two decimal places".to_string(),
        ));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(ServiceError::Validation(format!(
            "Amount can't exceed {MAX_AMOUNT}"
        )));
    }
    Ok(amount.round_dp(2))
}

/// What to do with a pending deposit given the gateway's view of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Complete,
    Cancel,
    Wait,
}

pub fn settlement_for(status: GatewayPaymentStatus) -> Settlement {
    match status {
        GatewayPaymentStatus::Succeeded => Settlement::Complete,
        GatewayPaymentStatus::Canceled => Settlement::Cancel,
        _ => Settlement::Wait,
    }
}

pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, timeout_secs: i64) -> bool {
    (now - created_at).num_seconds() > timeout_secs
}

pub async fn get(pool: &PgPool, user: &User) -> Result<Balance, ServiceError> {
    Ok(db::balance::fetch_or_create(pool, user.id).await?)
}

pub async fn transactions(
    pool: &PgPool,
    user: &User,
    filter: &TransactionFilter,
    pagination: &Pagination,
) -> Result<(Vec<Transaction>, i64), ServiceError> {
    Ok(db::transaction::list(pool, user.id, filter, pagination).await?)
}

#[tracing::instrument(name = "Top up balance", skip(pool, gateway, user), fields(user_id = user.id))]
pub async fn top_up(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    user: &User,
    amount: Decimal,
) -> Result<TopUp, ServiceError> {
    let amount = validate_amount(amount)?;
    db::balance::fetch_or_create(pool, user.id).await?;

    let description = format!("Balance top-up for user {}", user.id);
    let transaction =
        db::transaction::insert_pending_deposit(pool, user.id, amount, &description).await?;

    let payment = match gateway
        .create_payment(CreatePayment {
            amount,
            description,
            idempotence_key: uuid::Uuid::new_v4().to_string(),
            transaction_id: transaction.id,
            user_id: user.id,
        })
        .await
    {
        Ok(payment) => payment,
        Err(err) => {
            db::transaction::close_pending(pool, transaction.id, TransactionStatus::Failed).await?;
            return Err(err.into());
        }
    };

    let transaction = db::transaction::set_payment_id(pool, transaction.id, &payment.id).await?;
    Ok(TopUp {
        confirmation_url: payment.confirmation_url().map(String::from),
        transaction,
    })
}

#[tracing::instrument(name = "Withdraw from balance", skip(pool, user), fields(user_id = user.id))]
pub async fn withdraw(
    pool: &PgPool,
    user: &User,
    amount: Decimal,
) -> Result<(Balance, Transaction), ServiceError> {
    let amount = validate_amount(amount)?;
    db::balance::fetch_or_create(pool, user.id).await?;

    db::balance::withdraw(pool, user.id, amount, Some("Withdrawal"))
        .await?
        .ok_or_else(|| ServiceError::Validation("Insufficient funds".to_string()))
}

/// Applies a gateway status to a pending deposit. Both the webhook and the
/// reconciliation loop go through here; the guarded update credits once.
pub async fn settle(
    pool: &PgPool,
    notifier: &Notifier,
    transaction: &Transaction,
    settlement: Settlement,
) -> Result<bool, ServiceError> {
    match settlement {
        Settlement::Wait => Ok(false),
        Settlement::Cancel => {
            let changed =
                db::transaction::close_pending(pool, transaction.id, TransactionStatus::Cancelled)
                    .await?;
            if changed {
                tracing::info!("Deposit {} cancelled", transaction.id);
            }
            Ok(changed)
        }
        Settlement::Complete => {
            let (completed, balance) = match db::transaction::complete_deposit(pool, transaction.id).await? {
                Some(result) => result,
                None => return Ok(false),
            };
            tracing::info!(
                "Deposit {} credited {} to user {}",
                completed.id,
                completed.amount,
                completed.user_id
            );

            if let Some(owner) = db::user::fetch(pool, completed.user_id).await? {
                notifier.send(
                    owner.email.as_deref(),
                    "Balance topped up",
                    format!(
                        "Hello {},\n\n{} was added to your balance. Current balance: {}.\n",
                        owner.name, completed.amount, balance.amount
                    ),
                );
            }
            Ok(true)
        }
    }
}

/// Handles a gateway notification. The payload is only a hint: the payment is
/// re-read from the gateway before anything is credited.
#[tracing::instrument(name = "Payment webhook", skip_all, fields(payment_id = %notification.object.id))]
pub async fn handle_notification(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    notifier: &Notifier,
    notification: PaymentNotification,
) -> Result<(), ServiceError> {
    let transaction = db::transaction::fetch_by_payment_id(pool, &notification.object.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Payment"))?;

    if transaction.status != TransactionStatus::Pending {
        tracing::debug!("Transaction {} is already settled", transaction.id);
        return Ok(());
    }

    let payment = gateway.get_payment(&notification.object.id).await?;
    if payment.status != notification.object.status {
        tracing::warn!(
            "Notification says {:?} but gateway reports {:?}",
            notification.object.status,
            payment.status
        );
    }

    settle(pool, notifier, &transaction, settlement_for(payment.status)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_rules() {
        assert!(validate_amount(dec!(0)).is_err());
        assert!(validate_amount(dec!(-5)).is_err());
        assert!(validate_amount(dec!(10.005)).is_err());
        assert!(validate_amount(dec!(1000001)).is_err());
        assert_eq!(validate_amount(dec!(10.50)).unwrap(), dec!(10.50));
        assert_eq!(validate_amount(dec!(10.500)).unwrap(), dec!(10.50));
    }

    #[test]
    fn gateway_status_decides_settlement() {
        assert_eq!(
            settlement_for(GatewayPaymentStatus::Succeeded),
            Settlement::Complete
        );
        assert_eq!(
            settlement_for(GatewayPaymentStatus::Canceled),
            Settlement::Cancel
        );
        assert_eq!(settlement_for(GatewayPaymentStatus::Pending), Settlement::Wait);
        assert_eq!(
            settlement_for(GatewayPaymentStatus::WaitingForCapture),
            Settlement::Wait
        );
        assert_eq!(settlement_for(GatewayPaymentStatus::Unknown), Settlement::Wait);
    }

    #[test]
    fn expiry_is_strictly_after_timeout() {
        let created = Utc::now();
        assert!(!is_expired(created, created + chrono::Duration::seconds(3600), 3600));
        assert!(is_expired(created, created + chrono::Duration::seconds(3601), 3600));
    }
}
