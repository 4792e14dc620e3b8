use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
    options::{
        BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    publisher_confirm::Confirmation,
    types::{AMQPValue, FieldTable},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::repository::BrokerPort;
use crate::domain::types::{OutboundMessage, PublishOutcome};
use crate::error::GatewayError;

/// Process-wide AMQP connection shared by the publisher and the consumer
/// workers. Every operation opens its own channel; the connection is health
/// checked and lazily re-established before each channel open, so a dropped
/// broker link heals on the next use instead of poisoning the process.
pub struct Broker {
    url: String,
    exchange: String,
    queue: String,
    confirm_timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl Broker {
    pub fn new(url: String, exchange: String, queue: String, confirm_timeout: Duration) -> Self {
        Self {
            url,
            exchange,
            queue,
            confirm_timeout,
            connection: Mutex::new(None),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Open a fresh channel, reconnecting first if the shared connection is
    /// missing or no longer usable.
    pub async fn channel(&self) -> anyhow::Result<Channel> {
        let mut guard = self.connection.lock().await;
        let reconnect = match guard.as_ref() {
            Some(connection) => !connection.status().connected(),
            None => true,
        };
        if reconnect {
            let connection = Connection::connect(&self.url, ConnectionProperties::default())
                .await
                .context("connect to broker")?;
            info!(exchange = %self.exchange, "broker connection established");
            *guard = Some(connection);
        }
        let connection = guard.as_ref().expect("connection just established");
        let channel = connection
            .create_channel()
            .await
            .context("open broker channel")?;
        Ok(channel)
    }

    /// Declare the exchange and the inbound queue and bind them. Called once
    /// at startup; declarations are idempotent on the broker side.
    pub async fn declare_topology(&self) -> anyhow::Result<()> {
        let channel = self.channel().await?;
        channel
            .exchange_declare(
                &self.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("declare exchange")?;
        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .context("declare queue")?;
        channel
            .queue_bind(
                &self.queue,
                &self.exchange,
                "#",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .context("bind queue to exchange")?;
        Ok(())
    }
}

/// `BrokerPort` implementation over the shared connection.
#[derive(Clone)]
pub struct AmqpPublisher {
    pub broker: Arc<Broker>,
}

impl BrokerPort for AmqpPublisher {
    async fn publish(
        &self,
        message: &OutboundMessage,
        reliable: bool,
    ) -> Result<PublishOutcome, GatewayError> {
        let channel = self
            .broker
            .channel()
            .await
            .map_err(GatewayError::PublishFailed)?;
        if reliable {
            channel
                .confirm_select(ConfirmSelectOptions::default())
                .await
                .map_err(|e| {
                    GatewayError::PublishFailed(
                        anyhow::Error::new(e).context("enable confirm mode"),
                    )
                })?;
        }

        let payload = serde_json::to_vec(&message.payload)
            .map_err(|e| GatewayError::PublishFailed(anyhow::Error::new(e)))?;
        let mut headers = FieldTable::default();
        headers.insert(
            "origin_code".into(),
            AMQPValue::LongString(message.origin_code.clone().into()),
        );
        headers.insert(
            "origin_model".into(),
            AMQPValue::LongString(message.origin_model.clone().into()),
        );
        headers.insert(
            "api_key".into(),
            AMQPValue::LongString(message.api_key.clone().into()),
        );
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_headers(headers)
            // Transient: durability is tracked by our own status records, not
            // by the broker.
            .with_delivery_mode(1);

        let confirm = channel
            .basic_publish(
                self.broker.exchange(),
                &message.routing_key,
                BasicPublishOptions::default(),
                &payload,
                properties,
            )
            .await
            .map_err(|e| {
                GatewayError::PublishFailed(anyhow::Error::new(e).context("publish message"))
            })?;

        if !reliable {
            return Ok(PublishOutcome::Acked);
        }
        match tokio::time::timeout(self.broker.confirm_timeout, confirm).await {
            Err(_) => Ok(PublishOutcome::Unconfirmed),
            Ok(Err(e)) => Err(GatewayError::PublishFailed(
                anyhow::Error::new(e).context("await publish confirm"),
            )),
            Ok(Ok(Confirmation::Ack(_) | Confirmation::NotRequested)) => Ok(PublishOutcome::Acked),
            Ok(Ok(Confirmation::Nack(_))) => Ok(PublishOutcome::Nacked),
        }
    }
}
