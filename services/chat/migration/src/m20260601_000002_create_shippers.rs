use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shippers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Shippers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Shippers::CompanyName).string().not_null())
                    .col(ColumnDef::new(Shippers::ContactName).string())
                    .col(
                        ColumnDef::new(Shippers::GstNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shippers::Phone).string().not_null().unique_key())
                    .col(ColumnDef::new(Shippers::State).string().not_null())
                    .col(
                        ColumnDef::new(Shippers::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Shippers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Shippers::TotalLoads)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Shippers::Rating)
                            .double()
                            .not_null()
                            .default(5.0),
                    )
                    .col(
                        ColumnDef::new(Shippers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shippers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shippers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shippers {
    Table,
    Id,
    CompanyName,
    ContactName,
    GstNumber,
    Phone,
    State,
    Verified,
    Active,
    TotalLoads,
    Rating,
    CreatedAt,
    UpdatedAt,
}
