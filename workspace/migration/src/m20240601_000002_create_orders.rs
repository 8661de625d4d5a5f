use sea_orm_migration::{prelude::*, schema::*};

use crate::m20240601_000001_create_catalog::{Books, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create orders table
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(pk_auto(Orders::Id))
                    .col(integer_null(Orders::UserId))
                    .col(string(Orders::CustomerName))
                    .col(string(Orders::Phone))
                    .col(string(Orders::Address))
                    .col(string(Orders::City))
                    .col(integer_null(Orders::WilayaCode))
                    .col(string_null(Orders::WilayaName))
                    .col(string_null(Orders::Baladiya))
                    .col(decimal(Orders::ShippingPrice).decimal_len(12, 2).default(0))
                    .col(string_len(Orders::Status, 16).default("pending"))
                    .col(decimal(Orders::Total).decimal_len(12, 2))
                    .col(text_null(Orders::Notes))
                    .col(boolean(Orders::PointsAwarded).default(false))
                    .col(integer(Orders::PointsUsed).default(0))
                    .col(timestamp_with_time_zone(Orders::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .to_owned(),
            )
            .await?;

        // Create order_items table
        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(pk_auto(OrderItems::Id))
                    .col(integer(OrderItems::OrderId))
                    .col(integer_null(OrderItems::BookId))
                    .col(integer(OrderItems::Quantity))
                    .col(decimal(OrderItems::UnitPrice).decimal_len(12, 2))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_book")
                            .from(OrderItems::Table, OrderItems::BookId)
                            .to(Books::Table, Books::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_items_order_id")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        // Create activity_logs table (append-only, no foreign keys)
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(pk_auto(ActivityLogs::Id))
                    .col(integer(ActivityLogs::AdminId))
                    .col(string(ActivityLogs::AdminEmail))
                    .col(string(ActivityLogs::Action))
                    .col(string_null(ActivityLogs::EntityType))
                    .col(integer_null(ActivityLogs::EntityId))
                    .col(text_null(ActivityLogs::Details))
                    .col(timestamp_with_time_zone(ActivityLogs::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    UserId,
    CustomerName,
    Phone,
    Address,
    City,
    WilayaCode,
    WilayaName,
    Baladiya,
    ShippingPrice,
    Status,
    Total,
    Notes,
    PointsAwarded,
    PointsUsed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    BookId,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    AdminId,
    AdminEmail,
    Action,
    EntityType,
    EntityId,
    Details,
    CreatedAt,
}
