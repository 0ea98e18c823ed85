use crate::configuration::PaymentsSettings;
use crate::connectors::{GatewayPaymentStatus, PaymentGateway};
use crate::db;
use crate::services::balance::{is_expired, settle, settlement_for, Settlement};
use crate::services::Notifier;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub completed: usize,
    pub cancelled: usize,
    pub expired: usize,
    pub waiting: usize,
    pub failed: usize,
}

/// A paid deposit is always credited. An expired one is cancelled only once the
/// gateway has answered with a non-success status.
pub fn settlement_on_poll(status: GatewayPaymentStatus, expired: bool) -> Settlement {
    match settlement_for(status) {
        Settlement::Wait if expired => Settlement::Cancel,
        settlement => settlement,
    }
}

/// One pass over pending deposits. Per-item failures are logged and counted.
pub async fn reconcile_once(
    pool: &PgPool,
    gateway: &dyn PaymentGateway,
    notifier: &Notifier,
    settings: &PaymentsSettings,
) -> Result<ReconcileReport, sqlx::Error> {
    let pending = db::transaction::pending_deposits(pool).await?;
    let mut report = ReconcileReport::default();

    for transaction in pending {
        let now = Utc::now();
        let expired = is_expired(transaction.created_at, now, settings.pending_timeout_secs);

        let payment_id = transaction.payment_id.as_deref().unwrap_or_default();
        let settlement = match gateway.get_payment(payment_id).await {
            Ok(payment) => settlement_on_poll(payment.status, expired),
            Err(err) => {
                // Without an answer the deposit stays pending, even past the timeout.
                tracing::warn!("Polling payment {} failed: {}", payment_id, err);
                report.failed += 1;
                continue;
            }
        };

        match settle(pool, notifier, &transaction, settlement).await {
            Ok(true) => match settlement {
                Settlement::Complete => report.completed += 1,
                Settlement::Cancel if expired => report.expired += 1,
                Settlement::Cancel => report.cancelled += 1,
                Settlement::Wait => {}
            },
            Ok(false) => report.waiting += 1,
            Err(err) => {
                tracing::error!("Settling transaction {} failed: {}", transaction.id, err);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

pub fn spawn_payment_reconciliation(
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
    settings: PaymentsSettings,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(settings.reconcile_interval_secs.max(1)));
        tracing::info!("Payment reconciliation loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match reconcile_once(&pool, gateway.as_ref(), &notifier, &settings).await {
                        Ok(report) if report != ReconcileReport::default() => {
                            tracing::info!("Payment reconciliation: {:?}", report);
                        }
                        Ok(_) => {}
                        Err(err) => tracing::error!("Payment reconciliation failed: {:?}", err),
                    }
                }
            }
        }
        tracing::info!("Payment reconciliation loop stopped");
    })
}
