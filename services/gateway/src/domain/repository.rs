#![allow(async_fn_in_trait)]

use serde_json::Value;
use uuid::Uuid;

use crate::domain::types::{
    DeliveryOutcome, InboundMessage, InboundStatus, OutboundMessage, OutboundStatus,
    PublishOutcome, RoutingKey,
};
use crate::error::GatewayError;

/// Routing-key directory. The delivery core only reads; writes come from the
/// admin endpoints.
pub trait RoutingRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<RoutingKey>, GatewayError>;

    /// Key at position `value` within `group`, if one exists.
    async fn find_in_group(
        &self,
        group: &str,
        value: i32,
    ) -> Result<Option<RoutingKey>, GatewayError>;

    async fn create(&self, key: &RoutingKey) -> Result<(), GatewayError>;
}

/// Repository for inbound messages.
pub trait InboundRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InboundMessage>, GatewayError>;

    /// Most recent message in the `(origin_model, origin_code)` lineage that
    /// was addressed to `routing_key_name`. Used by the sequence gate.
    async fn find_latest_by_lineage(
        &self,
        origin_model: &str,
        origin_code: &str,
        routing_key_name: &str,
    ) -> Result<Option<InboundMessage>, GatewayError>;

    /// Up to `limit` messages currently in `status`, oldest first.
    async fn list_by_status(
        &self,
        status: InboundStatus,
        limit: u64,
    ) -> Result<Vec<InboundMessage>, GatewayError>;

    async fn create(&self, message: &InboundMessage) -> Result<(), GatewayError>;

    /// Full-record write-back; last writer wins.
    async fn update(&self, message: &InboundMessage) -> Result<(), GatewayError>;
}

/// Repository for outbound messages.
pub trait OutboundRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboundMessage>, GatewayError>;

    async fn list_by_status(
        &self,
        status: OutboundStatus,
        limit: u64,
    ) -> Result<Vec<OutboundMessage>, GatewayError>;

    async fn create(&self, message: &OutboundMessage) -> Result<(), GatewayError>;

    /// Full-record write-back; last writer wins.
    async fn update(&self, message: &OutboundMessage) -> Result<(), GatewayError>;
}

/// Outbound HTTP call to a resolved webhook target. Every failure mode is
/// folded into `DeliveryOutcome`, so the call itself is infallible.
pub trait WebhookPort: Send + Sync {
    async fn deliver(&self, key: &RoutingKey, payload: &Value, api_key: &str) -> DeliveryOutcome;
}

/// Publish onto the broker. `Err` means the publish call itself failed at the
/// transport level and no confirm will ever arrive; confirm results come back
/// as `PublishOutcome`.
pub trait BrokerPort: Send + Sync {
    async fn publish(
        &self,
        message: &OutboundMessage,
        reliable: bool,
    ) -> Result<PublishOutcome, GatewayError>;
}
