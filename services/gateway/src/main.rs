use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use relaymq_gateway::config::GatewayConfig;
use relaymq_gateway::consumer::spawn_consumers;
use relaymq_gateway::infra::broker::Broker;
use relaymq_gateway::infra::webhook::WebhookClient;
use relaymq_gateway::router::build_router;
use relaymq_gateway::scheduler::spawn_schedulers;
use relaymq_gateway::state::AppState;

#[tokio::main]
async fn main() {
    relaymq_core::tracing::init_tracing();

    let config = GatewayConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let broker = Arc::new(Broker::new(
        config.amqp_url.clone(),
        config.amqp_exchange.clone(),
        config.amqp_queue.clone(),
        Duration::from_secs(config.confirm_timeout_secs),
    ));
    broker
        .declare_topology()
        .await
        .expect("failed to declare broker topology");

    let webhook = WebhookClient::new(
        Duration::from_secs(config.webhook_timeout_secs),
        config.webhook_bearer_token.clone(),
    );

    let state = AppState {
        db,
        broker,
        webhook,
        config: Arc::new(config),
    };

    spawn_consumers(state.clone());
    spawn_schedulers(state.clone());

    let router = build_router(state.clone());
    let addr = format!("0.0.0.0:{}", state.config.gateway_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("gateway listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
