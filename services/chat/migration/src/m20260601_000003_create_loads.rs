use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Loads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Loads::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Loads::ShipperId).integer().not_null())
                    .col(ColumnDef::new(Loads::ShipperName).string().not_null())
                    .col(ColumnDef::new(Loads::ShipperPhone).string().not_null())
                    .col(ColumnDef::new(Loads::FromCity).string().not_null())
                    .col(ColumnDef::new(Loads::ToCity).string().not_null())
                    .col(ColumnDef::new(Loads::Material).string().not_null())
                    .col(ColumnDef::new(Loads::Weight).double().not_null())
                    .col(ColumnDef::new(Loads::VehicleType).string().not_null())
                    .col(ColumnDef::new(Loads::Price).double().not_null())
                    .col(ColumnDef::new(Loads::LoadingDate).date().not_null())
                    .col(ColumnDef::new(Loads::Status).string().not_null())
                    .col(
                        ColumnDef::new(Loads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Loads::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Loads::Table, Loads::ShipperId)
                            .to(Shippers::Table, Shippers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Loads::Table)
                    .col(Loads::Status)
                    .col(Loads::FromCity)
                    .name("idx_loads_status_from_city")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Loads::Table)
                    .col(Loads::ShipperId)
                    .name("idx_loads_shipper_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Loads::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Loads {
    Table,
    Id,
    ShipperId,
    ShipperName,
    ShipperPhone,
    FromCity,
    ToCity,
    Material,
    Weight,
    VehicleType,
    Price,
    LoadingDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Shippers {
    Table,
    Id,
}
