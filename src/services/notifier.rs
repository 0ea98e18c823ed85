use crate::configuration::MailSettings;
use crate::helpers::MqManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Queues outbound email. Delivery problems never fail the caller.
#[derive(Clone)]
pub struct Notifier {
    mq: Option<Arc<MqManager>>,
    settings: MailSettings,
}

impl Notifier {
    pub fn new(mq: Option<Arc<MqManager>>, settings: MailSettings) -> Self {
        Self { mq, settings }
    }

    /// Notifier that only logs, for processes without a broker.
    pub fn disabled() -> Self {
        Self::new(None, MailSettings::default())
    }

    pub fn send(&self, to: Option<&str>, subject: impl Into<String>, body: impl Into<String>) {
        let to = match to.map(str::trim).filter(|to| !to.is_empty()) {
            Some(to) => to.to_string(),
            None => {
                tracing::debug!("Recipient has no email address, skipping notification");
                return;
            }
        };
        let message = EmailMessage {
            to,
            subject: subject.into(),
            body: body.into(),
        };

        let mq = match &self.mq {
            Some(mq) => mq.clone(),
            None => {
                tracing::info!("Email queue is disabled, dropping {:?}", message.subject);
                return;
            }
        };
        let exchange = self.settings.exchange.clone();
        let routing_key = self.settings.routing_key.clone();

        tokio::spawn(async move {
            if let Err(err) = mq.publish_and_confirm(&exchange, &routing_key, &message).await {
                tracing::error!("Failed to queue email to {}: {}", message.to, err);
            }
        });
    }
}
