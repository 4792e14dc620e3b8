use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use relaymq_gateway::domain::repository::{
    BrokerPort, InboundRepository, OutboundRepository, RoutingRepository, WebhookPort,
};
use relaymq_gateway::domain::types::{
    DeliveryOutcome, InboundMessage, InboundStatus, OutboundMessage, OutboundStatus,
    PublishOutcome, RoutingKey,
};
use relaymq_gateway::error::GatewayError;

// ── InMemoryRouting ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct InMemoryRouting {
    pub keys: Arc<Mutex<Vec<RoutingKey>>>,
}

impl InMemoryRouting {
    pub fn new(keys: Vec<RoutingKey>) -> Self {
        Self {
            keys: Arc::new(Mutex::new(keys)),
        }
    }
}

impl RoutingRepository for InMemoryRouting {
    async fn find_by_name(&self, name: &str) -> Result<Option<RoutingKey>, GatewayError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.name == name)
            .cloned())
    }

    async fn find_in_group(
        &self,
        group: &str,
        value: i32,
    ) -> Result<Option<RoutingKey>, GatewayError> {
        Ok(self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.group.as_deref() == Some(group) && k.value == value)
            .cloned())
    }

    async fn create(&self, key: &RoutingKey) -> Result<(), GatewayError> {
        self.keys.lock().unwrap().push(key.clone());
        Ok(())
    }
}

// ── InMemoryInbound ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryInbound {
    pub messages: Arc<Mutex<Vec<InboundMessage>>>,
}

impl InMemoryInbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored copy of a message, panicking if it is gone.
    pub fn get(&self, id: Uuid) -> InboundMessage {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .expect("message not stored")
    }
}

impl InboundRepository for InMemoryInbound {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InboundMessage>, GatewayError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn find_latest_by_lineage(
        &self,
        origin_model: &str,
        origin_code: &str,
        routing_key_name: &str,
    ) -> Result<Option<InboundMessage>, GatewayError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                m.origin_model == origin_model
                    && m.origin_code == origin_code
                    && m.routing_key_name == routing_key_name
            })
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn list_by_status(
        &self,
        status: InboundStatus,
        limit: u64,
    ) -> Result<Vec<InboundMessage>, GatewayError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.status == status)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, message: &InboundMessage) -> Result<(), GatewayError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn update(&self, message: &InboundMessage) -> Result<(), GatewayError> {
        let mut messages = self.messages.lock().unwrap();
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(stored) => {
                *stored = message.clone();
                Ok(())
            }
            None => Err(GatewayError::MessageNotFound),
        }
    }
}

// ── InMemoryOutbound ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryOutbound {
    pub messages: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl InMemoryOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> OutboundMessage {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .expect("message not stored")
    }
}

impl OutboundRepository for InMemoryOutbound {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboundMessage>, GatewayError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list_by_status(
        &self,
        status: OutboundStatus,
        limit: u64,
    ) -> Result<Vec<OutboundMessage>, GatewayError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.status == status)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn update(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        let mut messages = self.messages.lock().unwrap();
        match messages.iter_mut().find(|m| m.id == message.id) {
            Some(stored) => {
                *stored = message.clone();
                Ok(())
            }
            None => Err(GatewayError::MessageNotFound),
        }
    }
}

// ── RecordingWebhook ─────────────────────────────────────────────────────────

/// Webhook double with a swappable outcome and a record of invoked key names.
#[derive(Clone)]
pub struct RecordingWebhook {
    outcome: Arc<Mutex<DeliveryOutcome>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingWebhook {
    pub fn respond_with(outcome: DeliveryOutcome) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_outcome(&self, outcome: DeliveryOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl WebhookPort for RecordingWebhook {
    async fn deliver(
        &self,
        key: &RoutingKey,
        _payload: &serde_json::Value,
        _api_key: &str,
    ) -> DeliveryOutcome {
        self.calls.lock().unwrap().push(key.name.clone());
        self.outcome.lock().unwrap().clone()
    }
}

// ── StubBroker ───────────────────────────────────────────────────────────────

pub enum PublishBehavior {
    Outcome(PublishOutcome),
    TransportError,
}

/// Broker double recording `(routing_key, reliable)` per publish call.
#[derive(Clone)]
pub struct StubBroker {
    behavior: Arc<Mutex<PublishBehavior>>,
    pub published: Arc<Mutex<Vec<(String, bool)>>>,
}

impl StubBroker {
    pub fn with_behavior(behavior: PublishBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn acking() -> Self {
        Self::with_behavior(PublishBehavior::Outcome(PublishOutcome::Acked))
    }
}

impl BrokerPort for StubBroker {
    async fn publish(
        &self,
        message: &OutboundMessage,
        reliable: bool,
    ) -> Result<PublishOutcome, GatewayError> {
        self.published
            .lock()
            .unwrap()
            .push((message.routing_key.clone(), reliable));
        match &*self.behavior.lock().unwrap() {
            PublishBehavior::Outcome(outcome) => Ok(*outcome),
            PublishBehavior::TransportError => Err(GatewayError::PublishFailed(anyhow::anyhow!(
                "broker unreachable"
            ))),
        }
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn routing_key(name: &str, group: Option<&str>, value: i32) -> RoutingKey {
    let now = Utc::now();
    RoutingKey {
        id: Uuid::new_v4(),
        name: name.into(),
        api_url: format!("http://hooks.test/{name}"),
        api_method: "POST".into(),
        group: group.map(Into::into),
        value,
        created_at: now,
        updated_at: now,
    }
}

pub fn received_message(routing_key_name: &str, origin_code: &str) -> InboundMessage {
    InboundMessage::received(
        routing_key_name.into(),
        serde_json::json!({"ref": origin_code}),
        origin_code.into(),
        "order".into(),
        "caller-key".into(),
    )
}

pub fn ok_response() -> DeliveryOutcome {
    DeliveryOutcome::Success {
        status: 200,
        detail: "POST http://hooks.test responded 200 OK".into(),
    }
}

pub fn timed_out() -> DeliveryOutcome {
    DeliveryOutcome::Unreachable {
        detail: "request to http://hooks.test failed: operation timed out".into(),
    }
}
