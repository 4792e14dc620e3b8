use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InboundMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InboundMessages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InboundMessages::RoutingKeyName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InboundMessages::RoutingKey).json_binary())
                    .col(
                        ColumnDef::new(InboundMessages::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InboundMessages::OriginCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InboundMessages::OriginModel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InboundMessages::Status).string().not_null())
                    .col(
                        ColumnDef::new(InboundMessages::Logs)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InboundMessages::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(InboundMessages::ApiKey).string().not_null())
                    .col(
                        ColumnDef::new(InboundMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InboundMessages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the retry/previous scheduler selection queries.
        manager
            .create_index(
                Index::create()
                    .table(InboundMessages::Table)
                    .col(InboundMessages::Status)
                    .name("idx_inbound_messages_status")
                    .to_owned(),
            )
            .await?;

        // Index for the sequence gate's predecessor lookup by lineage.
        manager
            .create_index(
                Index::create()
                    .table(InboundMessages::Table)
                    .col(InboundMessages::OriginModel)
                    .col(InboundMessages::OriginCode)
                    .col(InboundMessages::RoutingKeyName)
                    .name("idx_inbound_messages_lineage")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InboundMessages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InboundMessages {
    Table,
    Id,
    RoutingKeyName,
    RoutingKey,
    Payload,
    OriginCode,
    OriginModel,
    Status,
    Logs,
    Attempts,
    ApiKey,
    CreatedAt,
    UpdatedAt,
}
