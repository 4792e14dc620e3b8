use tracing::error;

use crate::domain::repository::{BrokerPort, OutboundRepository};
use crate::domain::types::{LogKind, NackPolicy, OutboundMessage, OutboundStatus, PublishOutcome};
use crate::error::GatewayError;

/// Publishes an outbound message and records the confirm result on its
/// persisted status. The broker accepting the publish call does not mean the
/// message reached a durable queue — only the confirm does, so the settled
/// status waits for it.
pub struct PublishMessageUseCase<'a, B, O> {
    pub broker: &'a B,
    pub outbound: &'a O,
    pub nack_policy: NackPolicy,
}

impl<B, O> PublishMessageUseCase<'_, B, O>
where
    B: BrokerPort,
    O: OutboundRepository,
{
    /// Publish `message`; with `reliable`, wait for the broker confirm and
    /// record the result. Returns the message with its post-publish status.
    pub async fn execute(
        &self,
        mut message: OutboundMessage,
        reliable: bool,
    ) -> Result<OutboundMessage, GatewayError> {
        match self.broker.publish(&message, reliable).await {
            Ok(PublishOutcome::Acked) => {
                message.status = OutboundStatus::Sent;
                self.outbound.update(&message).await?;
                Ok(message)
            }
            Ok(PublishOutcome::Nacked) => {
                self.record_unconfirmed(message, "broker rejected publish (nack)")
                    .await
            }
            Ok(PublishOutcome::Unconfirmed) => {
                self.record_unconfirmed(message, "no publish confirm before timeout")
                    .await
            }
            Err(e) => {
                // The publish call itself failed; no confirm will ever come.
                message.status = OutboundStatus::Failed;
                message.push_log(LogKind::NetworkError, format!("publish failed: {e}"));
                if let Err(persist_err) = self.outbound.update(&message).await {
                    error!(
                        message_id = %message.id,
                        error = %persist_err,
                        "failed to persist publish failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// A publish the broker did not positively confirm must not stay `wait`:
    /// park it per policy so operators see it instead of the resend pass
    /// looping over it.
    async fn record_unconfirmed(
        &self,
        mut message: OutboundMessage,
        detail: &str,
    ) -> Result<OutboundMessage, GatewayError> {
        message.status = match self.nack_policy {
            NackPolicy::SentWait => OutboundStatus::SentWait,
            NackPolicy::Failed => OutboundStatus::Failed,
        };
        message.push_log(LogKind::NetworkError, detail);
        self.outbound.update(&message).await?;
        Ok(message)
    }
}
