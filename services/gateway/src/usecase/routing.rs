use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::RoutingRepository;
use crate::domain::types::RoutingKey;
use crate::error::GatewayError;

// ── CreateRoutingKey ─────────────────────────────────────────────────────────

pub struct CreateRoutingKeyInput {
    pub name: String,
    pub api_url: String,
    pub api_method: String,
    pub group: Option<String>,
    pub value: Option<i32>,
}

pub struct CreateRoutingKeyUseCase<R: RoutingRepository> {
    pub repo: R,
}

impl<R: RoutingRepository> CreateRoutingKeyUseCase<R> {
    pub async fn execute(&self, input: CreateRoutingKeyInput) -> Result<RoutingKey, GatewayError> {
        if input.name.is_empty() || input.api_url.is_empty() || input.api_method.is_empty() {
            return Err(GatewayError::MissingData);
        }
        // An empty group string means "unordered", same as omitting it.
        let group = input.group.filter(|g| !g.is_empty());
        let value = input.value.unwrap_or(1);
        if group.is_some() && value < 1 {
            return Err(GatewayError::MissingData);
        }
        if self.repo.find_by_name(&input.name).await?.is_some() {
            return Err(GatewayError::DuplicateRoutingKey);
        }
        let now = Utc::now();
        let key = RoutingKey {
            id: Uuid::new_v4(),
            name: input.name,
            api_url: input.api_url,
            api_method: input.api_method,
            group,
            value,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&key).await?;
        Ok(key)
    }
}

// ── GetRoutingKey ────────────────────────────────────────────────────────────

pub struct GetRoutingKeyUseCase<R: RoutingRepository> {
    pub repo: R,
}

impl<R: RoutingRepository> GetRoutingKeyUseCase<R> {
    pub async fn execute(&self, name: &str) -> Result<RoutingKey, GatewayError> {
        self.repo
            .find_by_name(name)
            .await?
            .ok_or(GatewayError::RoutingKeyNotFound)
    }
}
