use std::time::Duration;

use http::Method;
use serde_json::Value;
use tracing::error;

use crate::domain::repository::WebhookPort;
use crate::domain::types::{DeliveryOutcome, RoutingKey};

/// Webhook invoker: one bounded-timeout HTTP call per delivery attempt, with
/// the outcome classified right here at the call site.
#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    bearer_token: String,
}

impl WebhookClient {
    pub fn new(timeout: Duration, bearer_token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build webhook HTTP client");
        Self {
            client,
            bearer_token,
        }
    }
}

impl WebhookPort for WebhookClient {
    async fn deliver(&self, key: &RoutingKey, payload: &Value, api_key: &str) -> DeliveryOutcome {
        let method = match Method::from_bytes(key.api_method.as_bytes()) {
            Ok(method) => method,
            Err(_) => {
                return DeliveryOutcome::Unreachable {
                    detail: format!(
                        "invalid api method {:?} on routing key {}",
                        key.api_method, key.name
                    ),
                };
            }
        };
        let result = self
            .client
            .request(method, &key.api_url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.bearer_token)
            .header("x-api-key", api_key)
            .json(payload)
            .send()
            .await;
        match result {
            Ok(response) => {
                let status = response.status();
                let detail = format!("{} {} responded {}", key.api_method, key.api_url, status);
                if status.is_success() {
                    DeliveryOutcome::Success {
                        status: status.as_u16(),
                        detail,
                    }
                } else {
                    DeliveryOutcome::Rejected {
                        status: status.as_u16(),
                        detail,
                    }
                }
            }
            Err(e) => {
                error!(url = %key.api_url, error = %e, "webhook request failed");
                DeliveryOutcome::Unreachable {
                    detail: format!("request to {} failed: {e}", key.api_url),
                }
            }
        }
    }
}
