use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Truckers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Truckers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Truckers::Name).string().not_null())
                    .col(ColumnDef::new(Truckers::Phone).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Truckers::VehicleNo)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Truckers::VehicleType).string().not_null())
                    .col(ColumnDef::new(Truckers::Capacity).double().not_null())
                    .col(
                        ColumnDef::new(Truckers::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Truckers::Rating)
                            .double()
                            .not_null()
                            .default(5.0),
                    )
                    .col(
                        ColumnDef::new(Truckers::TotalTrips)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Truckers::CurrentCity).string())
                    .col(
                        ColumnDef::new(Truckers::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Truckers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Truckers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Truckers::Table)
                    .col(Truckers::Available)
                    .name("idx_truckers_available")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Truckers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Truckers {
    Table,
    Id,
    Name,
    Phone,
    VehicleNo,
    VehicleType,
    Capacity,
    Verified,
    Rating,
    TotalTrips,
    CurrentCity,
    Available,
    CreatedAt,
    UpdatedAt,
}
