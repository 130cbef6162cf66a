use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bookings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bookings::LoadId).integer().not_null())
                    .col(ColumnDef::new(Bookings::TruckerId).integer().not_null())
                    .col(ColumnDef::new(Bookings::ShipperId).integer().not_null())
                    .col(ColumnDef::new(Bookings::AgreedPrice).double().not_null())
                    .col(ColumnDef::new(Bookings::Commission).double().not_null())
                    .col(ColumnDef::new(Bookings::NetAmount).double().not_null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::PaymentStatus).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Bookings::PickedUpAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::DeliveredAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Bookings::CancelledAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::LoadId)
                            .to(Loads::Table, Loads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Bookings::Table, Bookings::TruckerId)
                            .to(Truckers::Table, Truckers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::TruckerId)
                    .name("idx_bookings_trucker_id")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Bookings::Table)
                    .col(Bookings::LoadId)
                    .name("idx_bookings_load_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bookings {
    Table,
    Id,
    LoadId,
    TruckerId,
    ShipperId,
    AgreedPrice,
    Commission,
    NetAmount,
    Status,
    PaymentStatus,
    ConfirmedAt,
    PickedUpAt,
    DeliveredAt,
    CompletedAt,
    CancelledAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Loads {
    Table,
    Id,
}

#[derive(Iden)]
enum Truckers {
    Table,
    Id,
}
