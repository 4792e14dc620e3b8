use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OutboundMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OutboundMessages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OutboundMessages::RoutingKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboundMessages::Payload)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboundMessages::OriginCode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboundMessages::OriginModel)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OutboundMessages::Status).string().not_null())
                    .col(
                        ColumnDef::new(OutboundMessages::Logs)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OutboundMessages::ApiKey).string().not_null())
                    .col(
                        ColumnDef::new(OutboundMessages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OutboundMessages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the resend scheduler's wait-status selection.
        manager
            .create_index(
                Index::create()
                    .table(OutboundMessages::Table)
                    .col(OutboundMessages::Status)
                    .name("idx_outbound_messages_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OutboundMessages::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OutboundMessages {
    Table,
    Id,
    RoutingKey,
    Payload,
    OriginCode,
    OriginModel,
    Status,
    Logs,
    ApiKey,
    CreatedAt,
    UpdatedAt,
}
