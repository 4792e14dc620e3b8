use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use relaymq_core::health::{healthz, readyz};
use relaymq_core::middleware::request_id_layer;

use crate::handlers::{
    messages::{get_inbound_message, get_outbound_message},
    publish::publish_message,
    routing_keys::{create_routing_key, get_routing_key},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Publish
        .route("/api/v1/messages", post(publish_message))
        // Status queries
        .route("/api/v1/messages/in/{id}", get(get_inbound_message))
        .route("/api/v1/messages/out/{id}", get(get_outbound_message))
        // Routing keys
        .route("/api/v1/routing-keys", post(create_routing_key))
        .route("/api/v1/routing-keys/{name}", get(get_routing_key))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
