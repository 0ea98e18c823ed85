//! YooKassa payment gateway.

use crate::connectors::ConnectorError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::YookassaClient;
#[cfg(test)]
pub use mock::MockPaymentGateway;

#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub amount: Decimal,
    pub description: String,
    /// Reused on retries so the gateway creates the payment once
    pub idempotence_key: String,
    pub transaction_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayAmount {
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfirmation {
    #[serde(rename = "type")]
    pub kind: String,
    pub confirmation_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub status: GatewayPaymentStatus,
    #[serde(default)]
    pub paid: bool,
    pub amount: GatewayAmount,
    pub confirmation: Option<GatewayConfirmation>,
}

impl GatewayPayment {
    pub fn confirmation_url(&self) -> Option<&str> {
        self.confirmation
            .as_ref()
            .and_then(|confirmation| confirmation.confirmation_url.as_deref())
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(&self, request: CreatePayment) -> Result<GatewayPayment, ConnectorError>;

    async fn get_payment(&self, payment_id: &str) -> Result<GatewayPayment, ConnectorError>;
}
