use crate::domain::repository::{InboundRepository, RoutingRepository};
use crate::domain::types::{InboundMessage, RoutingKey};
use crate::error::GatewayError;

/// Outcome of a sequence-gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Satisfied,
    /// The named predecessor key has not reached a satisfying state yet.
    Blocked { predecessor: String },
}

/// Decides whether a message may be delivered, given its position in an
/// ordering group. Pure read; never mutates anything.
///
/// Ordering is keyed on the `(origin_model, origin_code)` lineage rather than
/// broker delivery order: deliveries fan out across workers and can arrive in
/// any order, so only the persisted predecessor state counts.
pub struct SequenceGate<'a, R, I> {
    pub routing: &'a R,
    pub inbound: &'a I,
}

impl<R, I> SequenceGate<'_, R, I>
where
    R: RoutingRepository,
    I: InboundRepository,
{
    /// Key at position `value - 1` in the same group. `None` when the key is
    /// unordered, first in its group, or the directory has no key at the
    /// previous position (no predecessor is expected then).
    async fn previous_of(&self, key: &RoutingKey) -> Result<Option<RoutingKey>, GatewayError> {
        let Some(group) = key.group.as_deref() else {
            return Ok(None);
        };
        if key.value <= 1 {
            return Ok(None);
        }
        self.routing.find_in_group(group, key.value - 1).await
    }

    pub async fn check(
        &self,
        key: &RoutingKey,
        message: &InboundMessage,
    ) -> Result<GateDecision, GatewayError> {
        let Some(prev_key) = self.previous_of(key).await? else {
            return Ok(GateDecision::Satisfied);
        };
        let prev_msg = self
            .inbound
            .find_latest_by_lineage(&message.origin_model, &message.origin_code, &prev_key.name)
            .await?;
        match prev_msg {
            Some(prev) if prev.status.satisfies_successor() => Ok(GateDecision::Satisfied),
            // No record yet means upstream has not arrived; a pending record
            // means it has not finished. Either way this message waits.
            _ => Ok(GateDecision::Blocked {
                predecessor: prev_key.name,
            }),
        }
    }
}
