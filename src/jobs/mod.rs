//! Fixed-interval background loops. Every loop stops when the shared
//! cancellation token fires.

mod eviction;
mod reconcile;

pub use eviction::{evict_once, spawn_auth_token_eviction, spawn_cache_eviction};
pub use reconcile::{reconcile_once, spawn_payment_reconciliation, ReconcileReport};

use crate::configuration::Settings;
use crate::connectors::PaymentGateway;
use crate::helpers::Cache;
use crate::services::Notifier;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub fn spawn_all(
    settings: &Settings,
    pool: PgPool,
    cache: Arc<dyn Cache>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_cache_eviction(
            cache.clone(),
            settings.jobs.cache_eviction_interval_secs,
            shutdown.clone(),
        ),
        spawn_auth_token_eviction(
            cache,
            settings.jobs.auth_token_eviction_interval_secs,
            shutdown.clone(),
        ),
        spawn_payment_reconciliation(
            pool,
            gateway,
            notifier,
            settings.payments.clone(),
            shutdown,
        ),
    ]
}
