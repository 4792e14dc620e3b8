use tracing::{debug, error, info};

use crate::domain::repository::{InboundRepository, RoutingRepository, WebhookPort};
use crate::domain::types::{InboundMessage, InboundStatus};
use crate::error::GatewayError;
use crate::usecase::process::{ProcessMessageUseCase, ProcessOutcome};
use crate::usecase::sequence::{GateDecision, SequenceGate};

/// Periodic re-driver for parked inbound messages. Selection is by status
/// only, so already-settled messages are never touched again; the passes are
/// pure functions of the batch limit and carry no timer of their own.
pub struct RetryPassUseCase<R, I, W> {
    pub routing: R,
    pub inbound: I,
    pub webhook: W,
    /// Attempt ceiling: reaching it forces `failed`.
    pub max_attempts: u32,
}

impl<R, I, W> RetryPassUseCase<R, I, W>
where
    R: RoutingRepository,
    I: InboundRepository,
    W: WebhookPort,
{
    /// Re-drive up to `limit` messages parked in `wait_retry`. Returns how
    /// many were processed.
    pub async fn run_retry_pass(&self, limit: u64) -> Result<usize, GatewayError> {
        let messages = self
            .inbound
            .list_by_status(InboundStatus::WaitRetry, limit)
            .await?;
        if messages.is_empty() {
            debug!("no wait_retry messages");
            return Ok(0);
        }
        info!(count = messages.len(), "retrying wait_retry messages");

        let mut processed = 0;
        for mut message in messages {
            self.drive(&mut message).await;
            processed += 1;
        }
        Ok(processed)
    }

    /// Re-drive up to `limit` messages parked behind a predecessor. Messages
    /// whose predecessor is still unfinished are skipped without any mutation
    /// at all — they are early, not broken. Returns how many were processed.
    pub async fn run_previous_pass(&self, limit: u64) -> Result<usize, GatewayError> {
        let messages = self
            .inbound
            .list_by_status(InboundStatus::WaitPrevMsg, limit)
            .await?;
        if messages.is_empty() {
            debug!("no wait_prev_msg messages");
            return Ok(0);
        }
        info!(count = messages.len(), "re-checking wait_prev_msg messages");

        let mut processed = 0;
        for mut message in messages {
            let satisfied = match &message.routing_key {
                Some(key) => {
                    let gate = SequenceGate {
                        routing: &self.routing,
                        inbound: &self.inbound,
                    };
                    matches!(gate.check(key, &message).await?, GateDecision::Satisfied)
                }
                // Key never resolved: let processing resolve it and re-check.
                None => true,
            };
            if !satisfied {
                debug!(message_id = %message.id, "predecessor still pending, skipping");
                continue;
            }
            self.drive(&mut message).await;
            processed += 1;
        }
        Ok(processed)
    }

    /// One processing attempt plus ceiling bookkeeping, persisted. Per-message
    /// failures are logged so one bad record cannot stall the pass.
    async fn drive(&self, message: &mut InboundMessage) {
        let process = ProcessMessageUseCase {
            routing: &self.routing,
            inbound: &self.inbound,
            webhook: &self.webhook,
        };
        match process.execute(message).await {
            Ok(ProcessOutcome::Retry | ProcessOutcome::Invalid) => {
                message.attempts += 1;
                // The ceiling check runs after the increment: the exhausting
                // pass ends in `failed` regardless of what the attempt itself
                // produced.
                if message.attempts >= self.max_attempts {
                    message.status = InboundStatus::Failed;
                }
            }
            Ok(ProcessOutcome::Delivered | ProcessOutcome::Deferred) => {}
            Err(e) => {
                error!(message_id = %message.id, error = %e, "processing attempt failed");
                return;
            }
        }
        if let Err(e) = self.inbound.update(message).await {
            error!(message_id = %message.id, error = %e, "failed to persist retry outcome");
        }
    }
}
