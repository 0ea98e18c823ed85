use super::{CreatePayment, GatewayPayment, PaymentGateway};
use crate::configuration::YookassaSettings;
use crate::connectors::errors::{from_status, ConnectorError};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::Instrument;

pub struct YookassaClient {
    base_url: String,
    shop_id: String,
    secret_key: String,
    return_url: String,
    http_client: reqwest::Client,
}

impl YookassaClient {
    pub fn new(settings: &YookassaSettings) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|err| ConnectorError::Internal(err.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            shop_id: settings.shop_id.clone(),
            secret_key: settings.secret_key.clone(),
            return_url: settings.return_url.clone(),
            http_client,
        })
    }

    async fn read_payment(response: reqwest::Response) -> Result<GatewayPayment, ConnectorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(from_status(status, body));
        }

        response
            .json::<GatewayPayment>()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for YookassaClient {
    async fn create_payment(&self, request: CreatePayment) -> Result<GatewayPayment, ConnectorError> {
        let span = tracing::info_span!(
            "Create YooKassa payment",
            transaction_id = request.transaction_id,
            user_id = request.user_id
        );

        let payload = json!({
            "amount": {
                "value": format!("{:.2}", request.amount),
                "currency": "RUB",
            },
            "capture": true,
            "confirmation": {
                "type": "redirect",
                "return_url": self.return_url,
            },
            "description": request.description,
            "metadata": {
                "transaction_id": request.transaction_id,
                "user_id": request.user_id,
            },
        });

        let response = self
            .http_client
            .post(format!("{}/payments", self.base_url))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .header("Idempotence-Key", &request.idempotence_key)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        Self::read_payment(response).await
    }

    async fn get_payment(&self, payment_id: &str) -> Result<GatewayPayment, ConnectorError> {
        let span = tracing::info_span!("Fetch YooKassa payment", payment_id = payment_id);
        let response = self
            .http_client
            .get(format!("{}/payments/{}", self.base_url, payment_id))
            .basic_auth(&self.shop_id, Some(&self.secret_key))
            .send()
            .instrument(span)
            .await?;

        Self::read_payment(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::GatewayPaymentStatus;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: String) -> YookassaSettings {
        YookassaSettings {
            base_url,
            shop_id: "shop".to_string(),
            secret_key: "secret".to_string(),
            return_url: "https://pcbuilds.example/balance".to_string(),
            timeout_secs: 5,
        }
    }

    fn payment_json(id: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "status": status,
            "paid": status == "succeeded",
            "amount": {"value": "150.00", "currency": "RUB"},
            "confirmation": {
                "type": "redirect",
                "confirmation_url": "https://yoomoney.example/checkout/1"
            },
            "created_at": "2024-01-10T12:00:00.000Z"
        })
    }

    #[tokio::test]
    async fn create_payment_sends_idempotence_key_and_parses_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments"))
            .and(header("Idempotence-Key", "key-1"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payment_json("pay-1", "pending")))
            .expect(1)
            .mount(&server)
            .await;

        let client = YookassaClient::new(&settings(server.uri())).unwrap();
        let payment = client
            .create_payment(CreatePayment {
                amount: dec!(150),
                description: "Top-up".to_string(),
                idempotence_key: "key-1".to_string(),
                transaction_id: 7,
                user_id: 3,
            })
            .await
            .unwrap();

        assert_eq!(payment.id, "pay-1");
        assert_eq!(payment.status, GatewayPaymentStatus::Pending);
        assert_eq!(
            payment.confirmation_url(),
            Some("https://yoomoney.example/checkout/1")
        );
    }

    #[tokio::test]
    async fn unknown_statuses_do_not_break_parsing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/pay-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(payment_json("pay-2", "refunded_partially")))
            .mount(&server)
            .await;

        let client = YookassaClient::new(&settings(server.uri())).unwrap();
        let payment = client.get_payment("pay-2").await.unwrap();
        assert_eq!(payment.status, GatewayPaymentStatus::Unknown);
    }

    #[tokio::test]
    async fn missing_payment_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payments/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = YookassaClient::new(&settings(server.uri())).unwrap();
        let err = client.get_payment("nope").await.unwrap_err();
        assert!(matches!(err, ConnectorError::NotFound(_)));
    }
}
