use tracing::{debug, error, info};

use crate::domain::repository::{BrokerPort, OutboundRepository};
use crate::domain::types::{NackPolicy, OutboundStatus};
use crate::error::GatewayError;
use crate::usecase::publish::PublishMessageUseCase;

/// Periodic re-publisher for outbound messages stuck in `wait` — typically
/// accepted over HTTP while the broker was down. Selection is by status only,
/// so settled messages are never re-published; there is no attempt ceiling on
/// this side, the broker/consumer boundary is expected to be idempotent per
/// message id.
pub struct ResendPassUseCase<B, O> {
    pub broker: B,
    pub outbound: O,
    pub nack_policy: NackPolicy,
}

impl<B, O> ResendPassUseCase<B, O>
where
    B: BrokerPort,
    O: OutboundRepository,
{
    /// Re-publish up to `limit` `wait` messages, reliably. Returns how many
    /// publishes were driven to a settled status.
    pub async fn run_resend_pass(&self, limit: u64) -> Result<usize, GatewayError> {
        let messages = self
            .outbound
            .list_by_status(OutboundStatus::Wait, limit)
            .await?;
        if messages.is_empty() {
            debug!("no wait messages to resend");
            return Ok(0);
        }
        info!(count = messages.len(), "resending wait messages");

        let mut resent = 0;
        for message in messages {
            let id = message.id;
            let publish = PublishMessageUseCase {
                broker: &self.broker,
                outbound: &self.outbound,
                nack_policy: self.nack_policy,
            };
            match publish.execute(message, true).await {
                Ok(message) => {
                    debug!(message_id = %message.id, status = %message.status, "resent");
                    resent += 1;
                }
                Err(e) => {
                    // Already persisted as failed by the publish usecase.
                    error!(message_id = %id, error = %e, "resend publish failed");
                }
            }
        }
        Ok(resent)
    }
}
