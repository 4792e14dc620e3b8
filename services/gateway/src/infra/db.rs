use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use relaymq_gateway_schema::{inbound_messages, outbound_messages, routing_keys};

use crate::domain::repository::{InboundRepository, OutboundRepository, RoutingRepository};
use crate::domain::types::{
    InboundMessage, InboundStatus, OutboundMessage, OutboundStatus, RoutingKey,
};
use crate::error::GatewayError;

// ── Routing-key repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoutingRepository {
    pub db: DatabaseConnection,
}

impl RoutingRepository for DbRoutingRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<RoutingKey>, GatewayError> {
        let model = routing_keys::Entity::find()
            .filter(routing_keys::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find routing key by name")?;
        Ok(model.map(routing_key_from_model))
    }

    async fn find_in_group(
        &self,
        group: &str,
        value: i32,
    ) -> Result<Option<RoutingKey>, GatewayError> {
        let model = routing_keys::Entity::find()
            .filter(routing_keys::Column::Group.eq(group))
            .filter(routing_keys::Column::Value.eq(value))
            .one(&self.db)
            .await
            .context("find routing key in group")?;
        Ok(model.map(routing_key_from_model))
    }

    async fn create(&self, key: &RoutingKey) -> Result<(), GatewayError> {
        routing_keys::ActiveModel {
            id: Set(key.id),
            name: Set(key.name.clone()),
            api_url: Set(key.api_url.clone()),
            api_method: Set(key.api_method.clone()),
            group: Set(key.group.clone()),
            value: Set(key.value),
            created_at: Set(key.created_at),
            updated_at: Set(key.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create routing key")?;
        Ok(())
    }
}

fn routing_key_from_model(model: routing_keys::Model) -> RoutingKey {
    RoutingKey {
        id: model.id,
        name: model.name,
        api_url: model.api_url,
        api_method: model.api_method,
        group: model.group,
        value: model.value,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Inbound-message repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInboundRepository {
    pub db: DatabaseConnection,
}

impl InboundRepository for DbInboundRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InboundMessage>, GatewayError> {
        let model = inbound_messages::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find inbound message by id")?;
        model.map(inbound_from_model).transpose()
    }

    async fn find_latest_by_lineage(
        &self,
        origin_model: &str,
        origin_code: &str,
        routing_key_name: &str,
    ) -> Result<Option<InboundMessage>, GatewayError> {
        let model = inbound_messages::Entity::find()
            .filter(inbound_messages::Column::OriginModel.eq(origin_model))
            .filter(inbound_messages::Column::OriginCode.eq(origin_code))
            .filter(inbound_messages::Column::RoutingKeyName.eq(routing_key_name))
            .order_by_desc(inbound_messages::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest inbound message by lineage")?;
        model.map(inbound_from_model).transpose()
    }

    async fn list_by_status(
        &self,
        status: InboundStatus,
        limit: u64,
    ) -> Result<Vec<InboundMessage>, GatewayError> {
        let models = inbound_messages::Entity::find()
            .filter(inbound_messages::Column::Status.eq(status.as_str()))
            .order_by_asc(inbound_messages::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list inbound messages by status")?;
        models.into_iter().map(inbound_from_model).collect()
    }

    async fn create(&self, message: &InboundMessage) -> Result<(), GatewayError> {
        inbound_active_model(message)?
            .insert(&self.db)
            .await
            .context("create inbound message")?;
        Ok(())
    }

    async fn update(&self, message: &InboundMessage) -> Result<(), GatewayError> {
        inbound_active_model(message)?
            .update(&self.db)
            .await
            .context("update inbound message")?;
        Ok(())
    }
}

fn inbound_from_model(model: inbound_messages::Model) -> Result<InboundMessage, GatewayError> {
    let status = model
        .status
        .parse::<InboundStatus>()
        .context("parse stored inbound status")?;
    let routing_key = model
        .routing_key
        .map(serde_json::from_value)
        .transpose()
        .context("decode stored routing key")?;
    let logs = serde_json::from_value(model.logs).context("decode stored delivery logs")?;
    Ok(InboundMessage {
        id: model.id,
        routing_key_name: model.routing_key_name,
        routing_key,
        payload: model.payload,
        origin_code: model.origin_code,
        origin_model: model.origin_model,
        status,
        logs,
        attempts: model.attempts as u32,
        api_key: model.api_key,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn inbound_active_model(
    message: &InboundMessage,
) -> Result<inbound_messages::ActiveModel, GatewayError> {
    let routing_key = message
        .routing_key
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .context("encode routing key")?;
    let logs = serde_json::to_value(&message.logs).context("encode delivery logs")?;
    Ok(inbound_messages::ActiveModel {
        id: Set(message.id),
        routing_key_name: Set(message.routing_key_name.clone()),
        routing_key: Set(routing_key),
        payload: Set(message.payload.clone()),
        origin_code: Set(message.origin_code.clone()),
        origin_model: Set(message.origin_model.clone()),
        status: Set(message.status.as_str().to_owned()),
        logs: Set(logs),
        attempts: Set(message.attempts as i32),
        api_key: Set(message.api_key.clone()),
        created_at: Set(message.created_at),
        updated_at: Set(Utc::now()),
    })
}

// ── Outbound-message repository ───────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboundRepository {
    pub db: DatabaseConnection,
}

impl OutboundRepository for DbOutboundRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OutboundMessage>, GatewayError> {
        let model = outbound_messages::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find outbound message by id")?;
        model.map(outbound_from_model).transpose()
    }

    async fn list_by_status(
        &self,
        status: OutboundStatus,
        limit: u64,
    ) -> Result<Vec<OutboundMessage>, GatewayError> {
        let models = outbound_messages::Entity::find()
            .filter(outbound_messages::Column::Status.eq(status.as_str()))
            .order_by_asc(outbound_messages::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("list outbound messages by status")?;
        models.into_iter().map(outbound_from_model).collect()
    }

    async fn create(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        outbound_active_model(message)?
            .insert(&self.db)
            .await
            .context("create outbound message")?;
        Ok(())
    }

    async fn update(&self, message: &OutboundMessage) -> Result<(), GatewayError> {
        outbound_active_model(message)?
            .update(&self.db)
            .await
            .context("update outbound message")?;
        Ok(())
    }
}

fn outbound_from_model(model: outbound_messages::Model) -> Result<OutboundMessage, GatewayError> {
    let status = model
        .status
        .parse::<OutboundStatus>()
        .context("parse stored outbound status")?;
    let logs = serde_json::from_value(model.logs).context("decode stored delivery logs")?;
    Ok(OutboundMessage {
        id: model.id,
        routing_key: model.routing_key,
        payload: model.payload,
        origin_code: model.origin_code,
        origin_model: model.origin_model,
        status,
        logs,
        api_key: model.api_key,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn outbound_active_model(
    message: &OutboundMessage,
) -> Result<outbound_messages::ActiveModel, GatewayError> {
    let logs = serde_json::to_value(&message.logs).context("encode delivery logs")?;
    Ok(outbound_messages::ActiveModel {
        id: Set(message.id),
        routing_key: Set(message.routing_key.clone()),
        payload: Set(message.payload.clone()),
        origin_code: Set(message.origin_code.clone()),
        origin_model: Set(message.origin_model.clone()),
        status: Set(message.status.as_str().to_owned()),
        logs: Set(logs),
        api_key: Set(message.api_key.clone()),
        created_at: Set(message.created_at),
        updated_at: Set(Utc::now()),
    })
}
