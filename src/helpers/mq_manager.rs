use deadpool_lapin::{Config, CreatePoolError, Object, Pool, Runtime};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{
    options::*,
    publisher_confirm::{Confirmation, PublisherConfirm},
    BasicProperties, Channel, ExchangeKind,
};
use serde::ser::Serialize;

/// Pooled RabbitMQ connections. The pool connects lazily, so a broker outage
/// only surfaces when something is published.
#[derive(Debug)]
pub struct MqManager {
    pool: Pool,
}

impl MqManager {
    pub fn try_new(url: String) -> Result<Self, std::io::Error> {
        let mut cfg = Config::default();
        cfg.url = Some(url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1)).map_err(|err| {
            tracing::error!("{:?}", err);

            match err {
                CreatePoolError::Config(_) => {
                    std::io::Error::new(std::io::ErrorKind::Other, "config error")
                }
                CreatePoolError::Build(_) => {
                    std::io::Error::new(std::io::ErrorKind::Other, "build error")
                }
            }
        })?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> Result<Object, String> {
        self.pool.get().await.map_err(|err| {
            let msg = format!("getting connection from pool {:?}", err);
            tracing::error!(msg);
            msg
        })
    }

    async fn create_channel(&self) -> Result<Channel, String> {
        self.get_connection()
            .await?
            .create_channel()
            .await
            .map_err(|err| {
                let msg = format!("creating RabbitMQ channel {:?}", err);
                tracing::error!(msg);
                msg
            })
    }

    async fn declare_exchange(channel: &Channel, exchange_name: &str) -> Result<(), String> {
        channel
            .exchange_declare(
                exchange_name,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    passive: false,
                    durable: true,
                    auto_delete: false,
                    internal: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|err| format!("declaring exchange {exchange_name}: {:?}", err))
    }

    pub async fn publish<T: ?Sized + Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        msg: &T,
    ) -> Result<PublisherConfirm, String> {
        let payload = serde_json::to_string::<T>(msg).map_err(|err| format!("{:?}", err))?;

        let channel = self.create_channel().await?;
        Self::declare_exchange(&channel, exchange).await?;

        channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload.as_bytes(),
                BasicProperties::default().with_content_type("application/json".into()),
            )
            .await
            .map_err(|err| {
                tracing::error!("publishing message {:?}", err);
                format!("publishing message {:?}", err)
            })
    }

    pub async fn publish_and_confirm<T: ?Sized + Serialize>(
        &self,
        exchange: &str,
        routing_key: &str,
        msg: &T,
    ) -> Result<(), String> {
        self.publish(exchange, routing_key, msg)
            .await?
            .await
            .map_err(|err| {
                let msg = format!("confirming the publication {:?}", err);
                tracing::error!(msg);
                msg
            })
            .and_then(|confirm| match confirm {
                Confirmation::Nack(_) => {
                    let msg = "publication was nacked by the broker".to_string();
                    tracing::error!(msg);
                    Err(msg)
                }
                _ => Ok(()),
            })
    }

    /// Declares the exchange and a durable queue bound to `routing_key`,
    /// returning a channel ready for `basic_consume`.
    pub async fn consume(
        &self,
        exchange_name: &str,
        queue_name: &str,
        routing_key: &str,
    ) -> Result<Channel, String> {
        let channel = self.create_channel().await?;
        Self::declare_exchange(&channel, exchange_name).await?;

        let mut args = FieldTable::default();
        args.insert("x-expires".into(), AMQPValue::LongUInt(3600000));

        channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    passive: false,
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    nowait: false,
                },
                args,
            )
            .await
            .map_err(|err| format!("declaring queue {queue_name}: {:?}", err))?;

        channel
            .queue_bind(
                queue_name,
                exchange_name,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|err| format!("binding queue {queue_name}: {:?}", err))?;

        Ok(channel)
    }
}
