use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoutingKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoutingKeys::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RoutingKeys::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RoutingKeys::ApiUrl).string().not_null())
                    .col(ColumnDef::new(RoutingKeys::ApiMethod).string().not_null())
                    .col(ColumnDef::new(RoutingKeys::Group).string())
                    .col(
                        ColumnDef::new(RoutingKeys::Value)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(RoutingKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoutingKeys::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One position per group: the sequence gate resolves the predecessor
        // by (group, value - 1), which must be unambiguous.
        manager
            .create_index(
                Index::create()
                    .table(RoutingKeys::Table)
                    .col(RoutingKeys::Group)
                    .col(RoutingKeys::Value)
                    .unique()
                    .name("idx_routing_keys_group_value")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoutingKeys::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RoutingKeys {
    Table,
    Id,
    Name,
    ApiUrl,
    ApiMethod,
    Group,
    Value,
    CreatedAt,
    UpdatedAt,
}
