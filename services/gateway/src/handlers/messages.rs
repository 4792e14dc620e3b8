use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::repository::{InboundRepository, OutboundRepository};
use crate::domain::types::DeliveryLog;
use crate::error::GatewayError;
use crate::state::AppState;

// ── GET /api/v1/messages/in/{id} ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct InboundMessageResponse {
    pub id: String,
    pub routing_key_name: String,
    pub payload: serde_json::Value,
    pub origin_code: String,
    pub origin_model: String,
    pub status: String,
    pub logs: Vec<DeliveryLog>,
    pub attempts: u32,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_inbound_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InboundMessageResponse>, GatewayError> {
    let message = state
        .inbound_repo()
        .find_by_id(id)
        .await?
        .ok_or(GatewayError::MessageNotFound)?;
    Ok(Json(InboundMessageResponse {
        id: message.id.to_string(),
        routing_key_name: message.routing_key_name,
        payload: message.payload,
        origin_code: message.origin_code,
        origin_model: message.origin_model,
        status: message.status.to_string(),
        logs: message.logs,
        attempts: message.attempts,
        created_at: message.created_at,
        updated_at: message.updated_at,
    }))
}

// ── GET /api/v1/messages/out/{id} ────────────────────────────────────────────

#[derive(Serialize)]
pub struct OutboundMessageResponse {
    pub id: String,
    pub routing_key: String,
    pub payload: serde_json::Value,
    pub origin_code: String,
    pub origin_model: String,
    pub status: String,
    pub logs: Vec<DeliveryLog>,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_outbound_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OutboundMessageResponse>, GatewayError> {
    let message = state
        .outbound_repo()
        .find_by_id(id)
        .await?
        .ok_or(GatewayError::MessageNotFound)?;
    Ok(Json(OutboundMessageResponse {
        id: message.id.to_string(),
        routing_key: message.routing_key,
        payload: message.payload,
        origin_code: message.origin_code,
        origin_model: message.origin_model,
        status: message.status.to_string(),
        logs: message.logs,
        created_at: message.created_at,
        updated_at: message.updated_at,
    }))
}
