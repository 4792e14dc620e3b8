use relaymq_gateway::domain::repository::InboundRepository;
use relaymq_gateway::domain::types::{InboundStatus, LogKind};
use relaymq_gateway::usecase::process::{ProcessMessageUseCase, ProcessOutcome};
use relaymq_gateway::usecase::retry::RetryPassUseCase;

use crate::helpers::{
    InMemoryInbound, InMemoryRouting, RecordingWebhook, ok_response, received_message,
    routing_key, timed_out,
};

#[tokio::test]
async fn attempts_grow_monotonically_until_the_ceiling_forces_failed() {
    let routing = InMemoryRouting::new(vec![routing_key("orders.created", None, 1)]);
    let inbound = InMemoryInbound::new();
    let webhook = RecordingWebhook::respond_with(timed_out());

    let mut message = received_message("orders.created", "O1");
    inbound.create(&message).await.unwrap();
    let process = ProcessMessageUseCase {
        routing: &routing,
        inbound: &inbound,
        webhook: &webhook,
    };
    process.execute(&mut message).await.unwrap();
    inbound.update(&message).await.unwrap();
    assert_eq!(message.status, InboundStatus::WaitRetry);
    assert_eq!(message.attempts, 0, "live processing is not an attempt");

    let pass = RetryPassUseCase {
        routing: routing.clone(),
        inbound: inbound.clone(),
        webhook: webhook.clone(),
        max_attempts: 3,
    };

    let mut seen = vec![inbound.get(message.id).attempts];
    for _ in 0..3 {
        pass.run_retry_pass(100).await.unwrap();
        seen.push(inbound.get(message.id).attempts);
    }
    assert_eq!(seen, vec![0, 1, 2, 3], "attempts only ever increase");
    assert_eq!(inbound.get(message.id).status, InboundStatus::Failed);

    // A failed message is out of the selection set: another pass is a no-op.
    let processed = pass.run_retry_pass(100).await.unwrap();
    assert_eq!(processed, 0);
    assert_eq!(inbound.get(message.id).attempts, 3);
}

#[tokio::test]
async fn recovered_webhook_settles_a_parked_message_as_success() {
    let routing = InMemoryRouting::new(vec![routing_key("orders.created", None, 1)]);
    let inbound = InMemoryInbound::new();
    let webhook = RecordingWebhook::respond_with(timed_out());

    let mut message = received_message("orders.created", "O1");
    inbound.create(&message).await.unwrap();
    ProcessMessageUseCase {
        routing: &routing,
        inbound: &inbound,
        webhook: &webhook,
    }
    .execute(&mut message)
    .await
    .unwrap();
    inbound.update(&message).await.unwrap();

    let pass = RetryPassUseCase {
        routing: routing.clone(),
        inbound: inbound.clone(),
        webhook: webhook.clone(),
        max_attempts: 3,
    };
    pass.run_retry_pass(100).await.unwrap();
    assert_eq!(inbound.get(message.id).attempts, 1);

    // Endpoint comes back: the next pass delivers without another attempt.
    webhook.set_outcome(ok_response());
    pass.run_retry_pass(100).await.unwrap();

    let stored = inbound.get(message.id);
    assert_eq!(stored.status, InboundStatus::Success);
    assert_eq!(stored.attempts, 1);
    // Full history: timeout from live processing, timeout from the first
    // pass, then the successful response.
    assert_eq!(stored.logs.len(), 3);
    assert_eq!(stored.logs[0].kind, LogKind::NetworkError);
    assert_eq!(stored.logs[2].kind, LogKind::HttpOutcome);
}

#[tokio::test]
async fn unknown_routing_key_settles_as_invalid_and_stays_there() {
    let routing = InMemoryRouting::new(vec![]);
    let inbound = InMemoryInbound::new();
    let webhook = RecordingWebhook::respond_with(ok_response());

    let mut message = received_message("ghost", "O1");
    inbound.create(&message).await.unwrap();
    let outcome = ProcessMessageUseCase {
        routing: &routing,
        inbound: &inbound,
        webhook: &webhook,
    }
    .execute(&mut message)
    .await
    .unwrap();
    inbound.update(&message).await.unwrap();

    assert_eq!(outcome, ProcessOutcome::Invalid);
    assert_eq!(message.status, InboundStatus::Invalid);

    // Neither scheduler pass selects an invalid message.
    let pass = RetryPassUseCase {
        routing: routing.clone(),
        inbound: inbound.clone(),
        webhook: webhook.clone(),
        max_attempts: 3,
    };
    assert_eq!(pass.run_retry_pass(100).await.unwrap(), 0);
    assert_eq!(pass.run_previous_pass(100).await.unwrap(), 0);

    let stored = inbound.get(message.id);
    assert_eq!(stored.status, InboundStatus::Invalid);
    assert_eq!(stored.attempts, 0);
    assert_eq!(webhook.call_count(), 0);
}

#[tokio::test]
async fn routing_key_deleted_midflight_counts_toward_the_ceiling() {
    // The message parked as wait_retry while its key existed; the key is gone
    // by the next pass. Each pass then classifies it invalid and counts an
    // attempt, until the ceiling forces failed.
    let routing = InMemoryRouting::new(vec![routing_key("orders.created", None, 1)]);
    let inbound = InMemoryInbound::new();
    let webhook = RecordingWebhook::respond_with(timed_out());

    let mut message = received_message("orders.created", "O1");
    inbound.create(&message).await.unwrap();
    ProcessMessageUseCase {
        routing: &routing,
        inbound: &inbound,
        webhook: &webhook,
    }
    .execute(&mut message)
    .await
    .unwrap();
    inbound.update(&message).await.unwrap();

    routing.keys.lock().unwrap().clear();

    let pass = RetryPassUseCase {
        routing: routing.clone(),
        inbound: inbound.clone(),
        webhook: webhook.clone(),
        max_attempts: 3,
    };
    pass.run_retry_pass(100).await.unwrap();

    let stored = inbound.get(message.id);
    assert_eq!(stored.status, InboundStatus::Invalid);
    assert_eq!(stored.attempts, 1);
}
