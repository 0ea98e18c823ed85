use crate::connectors::GatewayPaymentStatus;
use crate::models::{TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AmountForm {
    pub amount: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationObject {
    pub id: String,
    pub status: GatewayPaymentStatus,
}

/// Webhook body posted by the payment gateway.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub event: String,
    pub object: NotificationObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gateway_notification() {
        let raw = r#"{
            "type": "notification",
            "event": "payment.succeeded",
            "object": {"id": "2d2b", "status": "succeeded", "paid": true}
        }"#;
        let notification: PaymentNotification = serde_json::from_str(raw).unwrap();
        assert_eq!(notification.event, "payment.succeeded");
        assert_eq!(notification.object.status, GatewayPaymentStatus::Succeeded);
    }
}
