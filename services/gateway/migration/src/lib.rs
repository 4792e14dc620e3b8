use sea_orm_migration::prelude::*;

mod m20260801_000001_create_routing_keys;
mod m20260801_000002_create_inbound_messages;
mod m20260801_000003_create_outbound_messages;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_routing_keys::Migration),
            Box::new(m20260801_000002_create_inbound_messages::Migration),
            Box::new(m20260801_000003_create_outbound_messages::Migration),
        ]
    }
}
