use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Gateway service error variants.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("routing key not found")]
    RoutingKeyNotFound,
    #[error("routing key already exists")]
    DuplicateRoutingKey,
    #[error("message not found")]
    MessageNotFound,
    #[error("missing or invalid message data")]
    MissingData,
    #[error("publish to broker failed")]
    PublishFailed(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoutingKeyNotFound => "ROUTING_KEY_NOT_FOUND",
            Self::DuplicateRoutingKey => "DUPLICATE_ROUTING_KEY",
            Self::MessageNotFound => "MESSAGE_NOT_FOUND",
            Self::MissingData => "MISSING_DATA",
            Self::PublishFailed(_) => "PUBLISH_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::RoutingKeyNotFound | Self::MessageNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateRoutingKey => StatusCode::CONFLICT,
            Self::MissingData => StatusCode::BAD_REQUEST,
            Self::PublishFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 5xx only — tower-http TraceLayer already records method/uri/status
        // for all requests, and 4xx are expected client errors. Server-side
        // failures need their cause chain in the log to be traceable.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::PublishFailed(e) => {
                tracing::error!(error = %e, kind = "PUBLISH_FAILED", "publish failed")
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
