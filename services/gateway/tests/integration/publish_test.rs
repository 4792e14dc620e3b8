use relaymq_gateway::domain::repository::OutboundRepository;
use relaymq_gateway::domain::types::{
    NackPolicy, OutboundMessage, OutboundStatus, PublishOutcome,
};
use relaymq_gateway::error::GatewayError;
use relaymq_gateway::usecase::publish::PublishMessageUseCase;
use relaymq_gateway::usecase::resend::ResendPassUseCase;

use crate::helpers::{InMemoryOutbound, PublishBehavior, StubBroker};

fn wait_message(routing_key: &str) -> OutboundMessage {
    OutboundMessage::wait(
        routing_key.into(),
        serde_json::json!({"n": 1}),
        "O1".into(),
        "order".into(),
        "caller-key".into(),
    )
}

#[tokio::test]
async fn unreliable_publish_of_unrouted_key_goes_straight_to_sent() {
    // The outbound path has no ordering dependency and no directory lookup:
    // an arbitrary key string publishes fine.
    let broker = StubBroker::acking();
    let outbound = InMemoryOutbound::new();
    let message = wait_message("unknown");
    outbound.create(&message).await.unwrap();
    assert_eq!(outbound.get(message.id).status, OutboundStatus::Wait);

    let usecase = PublishMessageUseCase {
        broker: &broker,
        outbound: &outbound,
        nack_policy: NackPolicy::SentWait,
    };
    let result = usecase.execute(message, false).await.unwrap();

    assert_eq!(result.status, OutboundStatus::Sent);
    assert_eq!(outbound.get(result.id).status, OutboundStatus::Sent);
    let published = broker.published.lock().unwrap().clone();
    assert_eq!(published, vec![("unknown".to_owned(), false)]);
}

#[tokio::test]
async fn negative_confirm_never_leaves_the_message_in_wait() {
    let broker = StubBroker::with_behavior(PublishBehavior::Outcome(PublishOutcome::Nacked));
    let outbound = InMemoryOutbound::new();
    let message = wait_message("orders.created");
    outbound.create(&message).await.unwrap();

    let usecase = PublishMessageUseCase {
        broker: &broker,
        outbound: &outbound,
        nack_policy: NackPolicy::SentWait,
    };
    let result = usecase.execute(message, true).await.unwrap();

    assert_eq!(result.status, OutboundStatus::SentWait);
    assert_ne!(outbound.get(result.id).status, OutboundStatus::Wait);
}

#[tokio::test]
async fn transport_error_fails_the_message_and_surfaces_to_the_caller() {
    let broker = StubBroker::with_behavior(PublishBehavior::TransportError);
    let outbound = InMemoryOutbound::new();
    let message = wait_message("orders.created");
    let id = message.id;
    outbound.create(&message).await.unwrap();

    let usecase = PublishMessageUseCase {
        broker: &broker,
        outbound: &outbound,
        nack_policy: NackPolicy::SentWait,
    };
    let result = usecase.execute(message, true).await;

    assert!(matches!(result, Err(GatewayError::PublishFailed(_))));
    let stored = outbound.get(id);
    assert_eq!(stored.status, OutboundStatus::Failed);
    assert_eq!(stored.logs.len(), 1);
}

#[tokio::test]
async fn resend_pass_drains_wait_messages_and_leaves_settled_ones_alone() {
    let broker = StubBroker::acking();
    let outbound = InMemoryOutbound::new();

    let stuck_a = wait_message("orders.created");
    let stuck_b = wait_message("orders.paid");
    let mut settled = wait_message("orders.shipped");
    settled.status = OutboundStatus::Sent;
    for message in [&stuck_a, &stuck_b, &settled] {
        outbound.create(message).await.unwrap();
    }

    let pass = ResendPassUseCase {
        broker: broker.clone(),
        outbound: outbound.clone(),
        nack_policy: NackPolicy::SentWait,
    };
    let resent = pass.run_resend_pass(100).await.unwrap();

    assert_eq!(resent, 2);
    assert_eq!(outbound.get(stuck_a.id).status, OutboundStatus::Sent);
    assert_eq!(outbound.get(stuck_b.id).status, OutboundStatus::Sent);
    let published = broker.published.lock().unwrap().clone();
    assert_eq!(published.len(), 2, "settled messages are not republished");
    assert!(published.iter().all(|(_, reliable)| *reliable));

    // Everything settled: the next pass has nothing to do.
    assert_eq!(pass.run_resend_pass(100).await.unwrap(), 0);
}
