pub mod messages;
pub mod publish;
pub mod routing_keys;
