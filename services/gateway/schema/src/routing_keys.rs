use sea_orm::entity::prelude::*;

/// Delivery-target descriptor: webhook URL/method plus an optional ordering
/// group and sequence position. Administered out of band, read per message.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "routing_keys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub api_url: String,
    pub api_method: String,
    /// Ordering partition; NULL means the key has no ordering dependency.
    pub group: Option<String>,
    /// Sequence position within the group, starting at 1.
    pub value: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
