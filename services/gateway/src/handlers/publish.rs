use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};

use crate::domain::repository::OutboundRepository;
use crate::domain::types::OutboundMessage;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::usecase::publish::PublishMessageUseCase;

// ── POST /api/v1/messages ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PublishMessageRequest {
    pub routing_key: String,
    pub payload: serde_json::Value,
    pub origin_code: String,
    pub origin_model: String,
}

#[derive(Serialize)]
pub struct PublishMessageResponse {
    pub id: String,
    pub status: String,
}

/// Accept a message for publication: persist it as `wait`, then publish with
/// confirms. The caller sees synchronous failures only; confirm failures
/// surface through the status-query endpoint.
pub async fn publish_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PublishMessageRequest>,
) -> Result<Json<PublishMessageResponse>, GatewayError> {
    if body.routing_key.is_empty() || body.origin_code.is_empty() || body.origin_model.is_empty() {
        return Err(GatewayError::MissingData);
    }
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let message = OutboundMessage::wait(
        body.routing_key,
        body.payload,
        body.origin_code,
        body.origin_model,
        api_key,
    );
    let outbound = state.outbound_repo();
    outbound.create(&message).await?;

    let publisher = state.publisher();
    let usecase = PublishMessageUseCase {
        broker: &publisher,
        outbound: &outbound,
        nack_policy: state.config.nack_policy,
    };
    let message = usecase.execute(message, true).await?;

    Ok(Json(PublishMessageResponse {
        id: message.id.to_string(),
        status: message.status.to_string(),
    }))
}
