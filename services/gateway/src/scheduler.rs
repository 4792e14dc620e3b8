use std::time::Duration;

use tokio::time::interval;
use tracing::error;

use crate::state::AppState;
use crate::usecase::resend::ResendPassUseCase;
use crate::usecase::retry::RetryPassUseCase;

/// Spawn the periodic retry/previous/resend passes. The pass logic itself
/// lives in the usecases and takes only a batch limit, so tests drive it
/// directly without timers.
pub fn spawn_schedulers(state: AppState) {
    tokio::spawn(retry_loop(state.clone()));
    tokio::spawn(resend_loop(state));
}

async fn retry_loop(state: AppState) {
    let mut tick = interval(Duration::from_secs(state.config.retry_interval_secs));
    loop {
        tick.tick().await;
        let usecase = RetryPassUseCase {
            routing: state.routing_repo(),
            inbound: state.inbound_repo(),
            webhook: state.webhook.clone(),
            max_attempts: state.config.max_retry_times,
        };
        if let Err(e) = usecase.run_retry_pass(state.config.pass_batch_limit).await {
            error!(error = %e, "retry pass failed");
        }
        if let Err(e) = usecase
            .run_previous_pass(state.config.pass_batch_limit)
            .await
        {
            error!(error = %e, "previous pass failed");
        }
    }
}

async fn resend_loop(state: AppState) {
    let mut tick = interval(Duration::from_secs(state.config.resend_interval_secs));
    loop {
        tick.tick().await;
        let usecase = ResendPassUseCase {
            broker: state.publisher(),
            outbound: state.outbound_repo(),
            nack_policy: state.config.nack_policy,
        };
        if let Err(e) = usecase.run_resend_pass(state.config.pass_batch_limit).await {
            error!(error = %e, "resend pass failed");
        }
    }
}
