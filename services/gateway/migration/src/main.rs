use sea_orm_migration::prelude::*;

use relaymq_gateway_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
