use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::GatewayConfig;
use crate::infra::broker::{AmqpPublisher, Broker};
use crate::infra::db::{DbInboundRepository, DbOutboundRepository, DbRoutingRepository};
use crate::infra::webhook::WebhookClient;

/// Shared application state passed to every handler via axum `State` and to
/// the consumer workers and scheduler loops.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub broker: Arc<Broker>,
    pub webhook: WebhookClient,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn routing_repo(&self) -> DbRoutingRepository {
        DbRoutingRepository {
            db: self.db.clone(),
        }
    }

    pub fn inbound_repo(&self) -> DbInboundRepository {
        DbInboundRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbound_repo(&self) -> DbOutboundRepository {
        DbOutboundRepository {
            db: self.db.clone(),
        }
    }

    pub fn publisher(&self) -> AmqpPublisher {
        AmqpPublisher {
            broker: Arc::clone(&self.broker),
        }
    }
}
