use sea_orm::entity::prelude::*;

/// A message consumed from the broker, tracked through webhook delivery.
/// `routing_key` is the resolved key denormalized at processing time;
/// `logs` is an append-only JSON array of delivery-log entries.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inbound_messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub routing_key_name: String,
    pub routing_key: Option<Json>,
    pub payload: Json,
    pub origin_code: String,
    pub origin_model: String,
    pub status: String,
    pub logs: Json,
    pub attempts: i32,
    pub api_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
