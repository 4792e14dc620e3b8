use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::RoutingKey;
use crate::error::GatewayError;
use crate::state::AppState;
use crate::usecase::routing::{
    CreateRoutingKeyInput, CreateRoutingKeyUseCase, GetRoutingKeyUseCase,
};

#[derive(Serialize)]
pub struct RoutingKeyResponse {
    pub id: String,
    pub name: String,
    pub api_url: String,
    pub api_method: String,
    pub group: Option<String>,
    pub value: i32,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "relaymq_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RoutingKey> for RoutingKeyResponse {
    fn from(key: RoutingKey) -> Self {
        Self {
            id: key.id.to_string(),
            name: key.name,
            api_url: key.api_url,
            api_method: key.api_method,
            group: key.group,
            value: key.value,
            created_at: key.created_at,
            updated_at: key.updated_at,
        }
    }
}

// ── POST /api/v1/routing-keys ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRoutingKeyRequest {
    pub name: String,
    pub api_url: String,
    pub api_method: String,
    pub group: Option<String>,
    pub value: Option<i32>,
}

pub async fn create_routing_key(
    State(state): State<AppState>,
    Json(body): Json<CreateRoutingKeyRequest>,
) -> Result<(StatusCode, Json<RoutingKeyResponse>), GatewayError> {
    let usecase = CreateRoutingKeyUseCase {
        repo: state.routing_repo(),
    };
    let key = usecase
        .execute(CreateRoutingKeyInput {
            name: body.name,
            api_url: body.api_url,
            api_method: body.api_method,
            group: body.group,
            value: body.value,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(key.into())))
}

// ── GET /api/v1/routing-keys/{name} ──────────────────────────────────────────

pub async fn get_routing_key(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RoutingKeyResponse>, GatewayError> {
    let usecase = GetRoutingKeyUseCase {
        repo: state.routing_repo(),
    };
    let key = usecase.execute(&name).await?;
    Ok(Json(key.into()))
}
