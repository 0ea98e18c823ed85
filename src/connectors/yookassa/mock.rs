use super::{
    CreatePayment, GatewayAmount, GatewayConfirmation, GatewayPayment, GatewayPaymentStatus,
    PaymentGateway,
};
use crate::connectors::ConnectorError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory gateway: payments get sequential ids and a status set by the test.
#[derive(Default)]
pub struct MockPaymentGateway {
    statuses: Mutex<HashMap<String, GatewayPaymentStatus>>,
}

impl MockPaymentGateway {
    pub fn set_status(&self, payment_id: &str, status: GatewayPaymentStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(payment_id.to_string(), status);
    }

    fn payment(id: &str, status: GatewayPaymentStatus, amount: String) -> GatewayPayment {
        GatewayPayment {
            id: id.to_string(),
            status,
            paid: status == GatewayPaymentStatus::Succeeded,
            amount: GatewayAmount {
                value: amount,
                currency: "RUB".to_string(),
            },
            confirmation: Some(GatewayConfirmation {
                kind: "redirect".to_string(),
                confirmation_url: Some(format!("https://pay.example/{id}")),
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment(&self, request: CreatePayment) -> Result<GatewayPayment, ConnectorError> {
        let id = format!("mock-{}", request.transaction_id);
        self.set_status(&id, GatewayPaymentStatus::Pending);
        Ok(Self::payment(
            &id,
            GatewayPaymentStatus::Pending,
            format!("{:.2}", request.amount),
        ))
    }

    async fn get_payment(&self, payment_id: &str) -> Result<GatewayPayment, ConnectorError> {
        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(payment_id)
            .copied()
            .ok_or_else(|| ConnectorError::NotFound(payment_id.to_string()))?;
        Ok(Self::payment(payment_id, status, "0.00".to_string()))
    }
}
