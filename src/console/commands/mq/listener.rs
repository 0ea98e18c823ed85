use crate::configuration::{get_configuration, MailSettings};
use crate::helpers::MqManager;
use crate::services::EmailMessage;
use actix_web::rt;
use anyhow::{anyhow, Context};
use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions};
use lapin::types::FieldTable;

/// Drains the email queue into the HTTP mail relay.
pub struct ListenCommand {}

impl ListenCommand {
    pub fn new() -> Self {
        Self {}
    }
}

async fn relay(
    client: &reqwest::Client,
    settings: &MailSettings,
    message: &EmailMessage,
) -> anyhow::Result<()> {
    let response = client
        .post(&settings.relay_url)
        .json(message)
        .send()
        .await
        .context("mail relay is unreachable")?;

    if !response.status().is_success() {
        return Err(anyhow!("mail relay answered {}", response.status()));
    }
    Ok(())
}

impl crate::console::commands::CallableTrait for ListenCommand {
    fn call(&self) -> anyhow::Result<()> {
        rt::System::new().block_on(async {
            let settings = get_configuration().context("Failed to read configuration")?;
            let mail = settings.mail.clone();

            let mq_manager = MqManager::try_new(settings.amqp.connection_string())?;
            let consumer_channel = mq_manager
                .consume(&mail.exchange, &mail.queue, &mail.routing_key)
                .await
                .map_err(|err| anyhow!(err))?;

            let mut consumer = consumer_channel
                .basic_consume(
                    &mail.queue,
                    "console_mail_listener",
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await
                .context("Basic consume")?;

            let client = reqwest::Client::new();
            tracing::info!("Consuming {}", mail.queue);

            while let Some(delivery) = consumer.next().await {
                let delivery = match delivery {
                    Ok(delivery) => delivery,
                    Err(err) => {
                        tracing::error!("Consumer error: {:?}", err);
                        continue;
                    }
                };

                let message: EmailMessage = match serde_json::from_slice(&delivery.data) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::error!("Dropping malformed email message: {}", err);
                        delivery.ack(BasicAckOptions::default()).await?;
                        continue;
                    }
                };

                match relay(&client, &mail, &message).await {
                    Ok(()) => {
                        tracing::info!("Relayed email to {}", message.to);
                        delivery.ack(BasicAckOptions::default()).await?;
                    }
                    Err(err) => {
                        tracing::warn!("Email to {} not relayed: {:#}", message.to, err);
                        delivery
                            .nack(BasicNackOptions {
                                requeue: true,
                                ..Default::default()
                            })
                            .await?;
                    }
                }
            }

            Ok(())
        })
    }
}
