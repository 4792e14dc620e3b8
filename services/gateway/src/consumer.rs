use std::time::Duration;

use anyhow::Context as _;
use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::{AMQPValue, FieldTable};
use tracing::{debug, error, info, warn};

use crate::domain::repository::InboundRepository;
use crate::domain::types::InboundMessage;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::usecase::process::ProcessMessageUseCase;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawn the fixed-size consumer pool. Each worker holds its own channel on
/// the shared connection with prefetch 1, so the broker spreads deliveries
/// across workers and a slow webhook call blocks only its own worker.
pub fn spawn_consumers(state: AppState) {
    for worker in 0..state.config.consumer_workers {
        let state = state.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = consume(&state, worker).await {
                    warn!(worker, error = %e, "consumer stopped, reconnecting");
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        });
    }
}

async fn consume(state: &AppState, worker: usize) -> anyhow::Result<()> {
    let channel = state.broker.channel().await?;
    channel
        .basic_qos(1, BasicQosOptions::default())
        .await
        .context("set prefetch")?;
    let mut consumer = channel
        .basic_consume(
            state.broker.queue(),
            &format!("gateway-worker-{worker}"),
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .context("start consuming")?;
    info!(worker, queue = %state.broker.queue(), "consumer started");

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery.context("receive delivery")?;
        match build_message(&delivery) {
            Ok(mut message) => match handle_delivery(state, &mut message).await {
                Ok(()) => {
                    // Ack only after the state machine ran and the outcome is
                    // persisted; the message is now safe in our own records.
                    delivery.ack(BasicAckOptions::default()).await?;
                }
                Err(e) => {
                    error!(
                        worker,
                        message_id = %message.id,
                        error = %e,
                        "failed to process delivery, requeueing"
                    );
                    delivery
                        .nack(BasicNackOptions {
                            requeue: true,
                            ..Default::default()
                        })
                        .await?;
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
            Err(e) => {
                // Undecodable payloads would fail identically on redelivery.
                error!(worker, error = %e, "dropping undecodable delivery");
                delivery
                    .nack(BasicNackOptions {
                        requeue: false,
                        ..Default::default()
                    })
                    .await?;
            }
        }
    }
    Ok(())
}

/// Build an inbound record from a broker delivery: JSON body as the payload,
/// the delivery's routing key, and lineage/credential from the headers.
fn build_message(delivery: &Delivery) -> anyhow::Result<InboundMessage> {
    let payload = serde_json::from_slice(&delivery.data).context("decode delivery payload")?;
    let headers = delivery.properties.headers();
    Ok(InboundMessage::received(
        delivery.routing_key.as_str().to_owned(),
        payload,
        header_string(headers, "origin_code"),
        header_string(headers, "origin_model"),
        header_string(headers, "api_key"),
    ))
}

fn header_string(headers: &Option<FieldTable>, name: &str) -> String {
    headers
        .as_ref()
        .and_then(|table| {
            table
                .inner()
                .iter()
                .find(|(key, _)| key.as_str() == name)
                .map(|(_, value)| value)
        })
        .and_then(|value| match value {
            AMQPValue::LongString(s) => Some(String::from_utf8_lossy(s.as_bytes()).into_owned()),
            _ => None,
        })
        .unwrap_or_default()
}

async fn handle_delivery(state: &AppState, message: &mut InboundMessage) -> Result<(), GatewayError> {
    let routing = state.routing_repo();
    let inbound = state.inbound_repo();
    inbound.create(message).await?;

    let process = ProcessMessageUseCase {
        routing: &routing,
        inbound: &inbound,
        webhook: &state.webhook,
    };
    let outcome = process.execute(message).await?;
    inbound.update(message).await?;

    debug!(
        message_id = %message.id,
        status = %message.status,
        ?outcome,
        "processed inbound delivery"
    );
    Ok(())
}
