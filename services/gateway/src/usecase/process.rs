use tracing::{error, warn};

use crate::domain::repository::{InboundRepository, RoutingRepository, WebhookPort};
use crate::domain::types::{DeliveryOutcome, InboundMessage, InboundStatus, LogKind};
use crate::error::GatewayError;
use crate::usecase::sequence::{GateDecision, SequenceGate};

/// What a single processing attempt did. The caller persists the message and,
/// in scheduler passes, applies attempt/ceiling bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Webhook accepted the message (2xx).
    Delivered,
    /// Predecessor not satisfied; parked without counting an attempt.
    Deferred,
    /// Transient delivery failure; eligible for the retry pass.
    Retry,
    /// Unknown routing key; permanently unprocessable.
    Invalid,
}

/// The inbound state machine: one processing attempt per call. Resolves the
/// routing key, enforces sequence ordering, invokes the webhook and
/// classifies the result onto the message. Never writes to storage — a single
/// broker delivery gets exactly one call; repeated attempts are driven by the
/// retry scheduler.
pub struct ProcessMessageUseCase<'a, R, I, W> {
    pub routing: &'a R,
    pub inbound: &'a I,
    pub webhook: &'a W,
}

impl<R, I, W> ProcessMessageUseCase<'_, R, I, W>
where
    R: RoutingRepository,
    I: InboundRepository,
    W: WebhookPort,
{
    pub async fn execute(
        &self,
        message: &mut InboundMessage,
    ) -> Result<ProcessOutcome, GatewayError> {
        message.status = InboundStatus::Working;

        let key = match self.routing.find_by_name(&message.routing_key_name).await? {
            Some(key) => key,
            None => {
                // A bad routing key will not resolve itself: park permanently.
                message.status = InboundStatus::Invalid;
                message.push_log(
                    LogKind::ValidationError,
                    format!("unknown routing key {:?}", message.routing_key_name),
                );
                error!(
                    message_id = %message.id,
                    routing_key = %message.routing_key_name,
                    "cannot resolve routing key"
                );
                return Ok(ProcessOutcome::Invalid);
            }
        };
        message.routing_key = Some(key.clone());

        let gate = SequenceGate {
            routing: self.routing,
            inbound: self.inbound,
        };
        if let GateDecision::Blocked { predecessor } = gate.check(&key, message).await? {
            message.status = InboundStatus::WaitPrevMsg;
            message.push_log(
                LogKind::OrderingDeferral,
                format!("waiting for predecessor {predecessor}"),
            );
            warn!(
                message_id = %message.id,
                %predecessor,
                "deferred until predecessor completes"
            );
            return Ok(ProcessOutcome::Deferred);
        }

        match self
            .webhook
            .deliver(&key, &message.payload, &message.api_key)
            .await
        {
            DeliveryOutcome::Success { detail, .. } => {
                message.status = InboundStatus::Success;
                message.push_log(LogKind::HttpOutcome, detail);
                Ok(ProcessOutcome::Delivered)
            }
            DeliveryOutcome::Rejected { detail, .. } => {
                message.status = InboundStatus::WaitRetry;
                message.push_log(LogKind::HttpOutcome, detail);
                Ok(ProcessOutcome::Retry)
            }
            DeliveryOutcome::Unreachable { detail } => {
                message.status = InboundStatus::WaitRetry;
                message.push_log(LogKind::NetworkError, detail);
                Ok(ProcessOutcome::Retry)
            }
        }
    }
}
